//! Synthetic AR host for demos and tests.
//!
//! [`SyntheticFrame`] implements [`ArFrame`] over owned data and counts image
//! acquisitions and releases. [`HostStream`] replays a script of frames from a
//! background thread at a fixed frame interval, the way a render loop would.

use crate::error::ArFrameError;
use crate::host::{ArFrame, CameraImage};
use crate::types::{Pose, TrackingState};
use crate::Result;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What `acquire_camera_image` does for a synthetic frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Planes in order Y, U, V.
    Ready(Vec<Vec<u8>>),
    NotYetAvailable,
    /// Acquisition fails with `ArFrameError::Host`.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    pose: Pose,
    tracking_state: TrackingState,
    timestamp_ns: i64,
    image: ImageSource,
    acquisitions: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl SyntheticFrame {
    pub fn new(
        pose: Pose,
        tracking_state: TrackingState,
        timestamp_ns: i64,
        image: ImageSource,
    ) -> Self {
        Self {
            pose,
            tracking_state,
            timestamp_ns,
            image,
            acquisitions: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of images successfully acquired from this frame.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of `close()` calls on images acquired from this frame.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ArFrame for SyntheticFrame {
    type Image = SyntheticImage;

    fn pose(&self) -> Pose {
        self.pose
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking_state
    }

    fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }

    fn acquire_camera_image(&self) -> Result<SyntheticImage> {
        match &self.image {
            ImageSource::Ready(planes) => {
                self.acquisitions.fetch_add(1, Ordering::SeqCst);
                Ok(SyntheticImage {
                    planes: planes.clone(),
                    releases: self.releases.clone(),
                })
            }
            ImageSource::NotYetAvailable => Err(ArFrameError::NotYetAvailable),
            ImageSource::Failed(reason) => Err(ArFrameError::Host(reason.clone())),
        }
    }
}

#[derive(Debug)]
pub struct SyntheticImage {
    planes: Vec<Vec<u8>>,
    releases: Arc<AtomicUsize>,
}

impl CameraImage for SyntheticImage {
    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    fn close(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Parameters for [`walk`]: a camera moving in a straight line.
#[derive(Debug, Clone)]
pub struct WalkParams {
    pub frames: usize,
    pub start: [f64; 3],
    /// Translation added per frame, in meters.
    pub step: [f64; 3],
    pub width: usize,
    pub height: usize,
    pub frame_interval_ns: i64,
    /// Frames before this index report `Paused`.
    pub tracking_from: usize,
    /// Every Nth frame has no image ready yet (0 = never).
    pub not_ready_every: usize,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            frames: 30,
            start: [0.0; 3],
            step: [0.01, 0.0, -0.005],
            width: 64,
            height: 48,
            frame_interval_ns: 33_333_333,
            tracking_from: 3,
            not_ready_every: 0,
        }
    }
}

/// Generate a straight-line walk with YUV 4:2:0 planes (Y = w*h, U = V = w*h/4).
pub fn walk(params: &WalkParams) -> Vec<SyntheticFrame> {
    let luma_len = params.width * params.height;
    let chroma_len = luma_len / 4;

    (0..params.frames)
        .map(|i| {
            let t = i as f64;
            let pose = Pose::from_translation(
                params.start[0] + params.step[0] * t,
                params.start[1] + params.step[1] * t,
                params.start[2] + params.step[2] * t,
            );
            let state = if i >= params.tracking_from {
                TrackingState::Tracking
            } else {
                TrackingState::Paused
            };
            let image = if params.not_ready_every > 0 && i % params.not_ready_every == 0 {
                ImageSource::NotYetAvailable
            } else {
                let y: Vec<u8> = (0..luma_len).map(|p| (p + i) as u8).collect();
                ImageSource::Ready(vec![y, vec![0x80; chroma_len], vec![0x7F; chroma_len]])
            };
            SyntheticFrame::new(pose, state, i as i64 * params.frame_interval_ns, image)
        })
        .collect()
}

/// How long the host thread blocks on a full channel before rechecking the stop flag.
const SEND_POLL: Duration = Duration::from_millis(100);

/// Handle to a background thread replaying frames like a host render loop.
///
/// Each tick delivers `Some(frame)` or `None` (host had no frame). Every tick
/// of the script is delivered in order; a slow consumer blocks the host thread
/// instead of losing frames. When the script ends the thread exits and
/// receivers see `StreamStopped`.
pub struct HostStream {
    receiver: Receiver<Option<SyntheticFrame>>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl HostStream {
    /// Start replaying `script`, one entry per `interval`.
    pub fn start(script: Vec<Option<SyntheticFrame>>, interval: Duration) -> Result<HostStream> {
        let (sender, receiver) = crossbeam_channel::bounded(64);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let thread = std::thread::Builder::new()
            .name("arframe-host".into())
            .spawn(move || {
                host_loop(script, interval, sender, stop_clone);
            })
            .map_err(|e| ArFrameError::Host(format!("Failed to spawn host thread: {}", e)))?;

        Ok(HostStream {
            receiver,
            stop_flag,
            thread: Some(thread),
        })
    }

    /// Receive the next tick (blocks until available).
    pub fn recv(&self) -> Result<Option<SyntheticFrame>> {
        self.receiver.recv().map_err(|_| ArFrameError::StreamStopped)
    }

    /// Try to receive a tick without blocking.
    pub fn try_recv(&self) -> Option<Option<SyntheticFrame>> {
        self.receiver.try_recv().ok()
    }

    /// Receive a tick with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<SyntheticFrame>> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => ArFrameError::Timeout,
            crossbeam_channel::RecvTimeoutError::Disconnected => ArFrameError::StreamStopped,
        })
    }

    pub fn is_active(&self) -> bool {
        !self.stop_flag.load(Ordering::Relaxed)
    }

    /// Stop the stream and wait for the host thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for HostStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn host_loop(
    script: Vec<Option<SyntheticFrame>>,
    interval: Duration,
    sender: Sender<Option<SyntheticFrame>>,
    stop_flag: Arc<AtomicBool>,
) {
    log::info!("Synthetic host started ({} ticks)", script.len());

    for tick in script {
        if stop_flag.load(Ordering::Relaxed) {
            log::info!("Synthetic host stopping (stop flag set)");
            return;
        }
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }

        let mut pending = tick;
        loop {
            match sender.send_timeout(pending, SEND_POLL) {
                Ok(()) => break,
                Err(crossbeam_channel::SendTimeoutError::Timeout(tick)) => {
                    if stop_flag.load(Ordering::Relaxed) {
                        log::info!("Synthetic host stopping (stop flag set)");
                        return;
                    }
                    log::trace!("Host channel full, waiting for consumer");
                    pending = tick;
                }
                Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => {
                    log::info!("Host channel disconnected, stopping");
                    return;
                }
            }
        }
    }

    log::info!("Synthetic host finished script");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_plane_sizes_and_states() {
        let frames = walk(&WalkParams {
            frames: 5,
            width: 8,
            height: 4,
            tracking_from: 2,
            ..WalkParams::default()
        });
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].tracking_state(), TrackingState::Paused);
        assert_eq!(frames[2].tracking_state(), TrackingState::Tracking);
        assert_eq!(frames[1].timestamp_ns(), 33_333_333);

        let image = frames[3].acquire_camera_image().unwrap();
        assert_eq!(image.plane_count(), 3);
        assert_eq!(image.plane(0).unwrap().len(), 32);
        assert_eq!(image.plane(1).unwrap().len(), 8);
        assert_eq!(image.plane(2).unwrap().len(), 8);
    }

    #[test]
    fn test_walk_not_ready_cadence() {
        let frames = walk(&WalkParams {
            frames: 7,
            not_ready_every: 3,
            ..WalkParams::default()
        });
        let not_ready: Vec<usize> = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.acquire_camera_image().is_err())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(not_ready, vec![0, 3, 6]);
    }

    #[test]
    fn test_release_counter_shared_with_clones() {
        let frame = SyntheticFrame::new(
            Pose::IDENTITY,
            TrackingState::Tracking,
            0,
            ImageSource::Ready(vec![vec![1], vec![2]]),
        );
        let copy = frame.clone();
        let mut image = copy.acquire_camera_image().unwrap();
        image.close();
        assert_eq!(frame.acquisitions(), 1);
        assert_eq!(frame.releases(), 1);
    }

    #[test]
    fn test_host_stream_delivers_script_then_stops() {
        let mut script: Vec<Option<SyntheticFrame>> = walk(&WalkParams {
            frames: 4,
            ..WalkParams::default()
        })
        .into_iter()
        .map(Some)
        .collect();
        script.insert(2, None);

        let stream = HostStream::start(script, Duration::ZERO).unwrap();
        let mut ticks = Vec::new();
        loop {
            match stream.recv_timeout(Duration::from_secs(5)) {
                Ok(tick) => ticks.push(tick.map(|f| f.timestamp_ns())),
                Err(ArFrameError::StreamStopped) => break,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(
            ticks,
            vec![Some(0), Some(33_333_333), None, Some(66_666_666), Some(99_999_999)]
        );
    }

    #[test]
    fn test_host_stream_waits_for_slow_consumer() {
        let script: Vec<Option<SyntheticFrame>> = walk(&WalkParams {
            frames: 200,
            width: 4,
            height: 4,
            ..WalkParams::default()
        })
        .into_iter()
        .map(Some)
        .collect();

        let stream = HostStream::start(script, Duration::ZERO).unwrap();
        // Let the host fill the channel well past its capacity.
        std::thread::sleep(Duration::from_millis(200));

        let mut timestamps = Vec::new();
        loop {
            match stream.recv_timeout(Duration::from_secs(5)) {
                Ok(tick) => timestamps.push(tick.unwrap().timestamp_ns()),
                Err(ArFrameError::StreamStopped) => break,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        let expected: Vec<i64> = (0..200).map(|i| i * 33_333_333).collect();
        assert_eq!(timestamps, expected);
    }

    #[test]
    fn test_host_stream_stop_unblocks_full_channel() {
        let script = vec![None; 500];
        let stream = HostStream::start(script, Duration::ZERO).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        stream.stop();
    }

    #[test]
    fn test_host_stream_stop_joins_thread() {
        let script = vec![None; 1000];
        let stream = HostStream::start(script, Duration::from_millis(1)).unwrap();
        assert!(stream.is_active());
        stream.stop();
    }
}
