use crate::config::SessionConfig;
use crate::host::ArFrame;
use crate::packer::{PackOutcome, PackedBuffer, PlanePacker};
use crate::tracker::PoseDeltaTracker;
use crate::types::{FrameUpdate, UpdateEvents};
use crate::Result;

/// Per-session state the host drives once per rendered frame.
///
/// Created at session start and dropped at session end. Calls must not
/// overlap; wrap the session in a lock to share it across threads.
#[derive(Debug)]
pub struct FrameSession {
    config: SessionConfig,
    tracker: PoseDeltaTracker,
    packer: PlanePacker,
    frames_seen: u64,
    frames_packed: u64,
    total_distance_m: f64,
}

impl Default for FrameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl FrameSession {
    pub fn new(config: SessionConfig) -> Self {
        let packer = PlanePacker::new(config.initial_buffer_capacity);
        Self {
            config,
            tracker: PoseDeltaTracker::new(),
            packer,
            frames_seen: 0,
            frames_packed: 0,
            total_distance_m: 0.0,
        }
    }

    /// Per-frame entry point. `None` means the host had no frame this tick.
    ///
    /// Errors other than an image that is not yet available propagate.
    pub fn on_frame_update<F: ArFrame>(&mut self, frame: Option<&F>) -> Result<FrameUpdate> {
        match frame {
            Some(frame) => self.process_frame(frame),
            None => Ok(self.on_no_frame()),
        }
    }

    /// Host tick without a frame. Session state is left as it was and no
    /// tracking transition is reported.
    pub fn on_no_frame(&self) -> FrameUpdate {
        log::trace!("No frame this tick");
        FrameUpdate {
            packed_len: self.packed_data().len(),
            events: UpdateEvents::NO_FRAME,
            ..FrameUpdate::default()
        }
    }

    fn process_frame<F: ArFrame>(&mut self, frame: &F) -> Result<FrameUpdate> {
        self.frames_seen += 1;
        let timestamp_ns = frame.timestamp_ns();
        let pose = frame.pose();
        let delta = self.tracker.measure(pose, frame.tracking_state());

        let mut events = UpdateEvents::empty();
        if delta.tracking_changed {
            if delta.is_tracking {
                log::debug!("Tracking started at t={}", timestamp_ns);
                events |= UpdateEvents::TRACKING_STARTED;
            } else {
                log::debug!("Tracking stopped at t={}", timestamp_ns);
                events |= UpdateEvents::TRACKING_STOPPED;
            }
        }

        if self.config.log_every > 0 && self.frames_seen % u64::from(self.config.log_every) == 0 {
            log::info!(
                "distance={:.4}[m] timestamp={}",
                delta.distance_m,
                timestamp_ns
            );
            if let Some(anchor) = delta.anchor_distance_m {
                log::info!("anchor distance={:.3}[m]", anchor);
            }
        }

        if self.config.pack_images {
            match self.packer.pack(frame)? {
                PackOutcome::Packed { grown, .. } => {
                    self.frames_packed += 1;
                    events |= UpdateEvents::IMAGE_PACKED;
                    if grown {
                        events |= UpdateEvents::BUFFER_GROWN;
                    }
                }
                PackOutcome::NotYetAvailable => events |= UpdateEvents::IMAGE_NOT_READY,
            }
        }

        // The last pose only moves once the whole frame went through.
        self.tracker.commit(pose);
        self.total_distance_m += delta.distance_m;

        Ok(FrameUpdate {
            timestamp_ns: Some(timestamp_ns),
            distance_m: Some(delta.distance_m),
            anchor_distance_m: delta.anchor_distance_m,
            packed_len: self.packed_data().len(),
            events,
        })
    }

    /// Bytes packed from the most recent image (Y followed by U).
    pub fn packed_data(&self) -> &[u8] {
        self.packer.buffer().as_slice()
    }

    pub fn packed_buffer(&self) -> &PackedBuffer {
        self.packer.buffer()
    }

    pub fn tracker(&self) -> &PoseDeltaTracker {
        &self.tracker
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Measure distances from the next frame's pose.
    pub fn set_anchor(&mut self) {
        self.tracker.set_anchor();
    }

    pub fn clear_anchor(&mut self) {
        self.tracker.clear_anchor();
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn frames_packed(&self) -> u64 {
        self.frames_packed
    }

    /// Sum of frame-to-frame distances, in meters.
    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }
}
