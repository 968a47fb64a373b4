use crate::types::{Pose, TrackingState};

/// Result of feeding one frame's pose to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseDelta {
    /// Distance in meters from the previous frame's pose (0 on the first frame).
    pub distance_m: f64,
    /// Distance in meters from the anchor pose, if one is set.
    pub anchor_distance_m: Option<f64>,
    pub is_tracking: bool,
    /// True only when `is_tracking` differs from the previous update.
    pub tracking_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    None,
    /// The next pose seen becomes the anchor.
    Armed,
    Set(Pose),
}

/// Remembers the last camera pose and the tracking flag across frames.
#[derive(Debug, Clone)]
pub struct PoseDeltaTracker {
    last_pose: Option<Pose>,
    is_tracking: bool,
    anchor: Anchor,
}

impl Default for PoseDeltaTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseDeltaTracker {
    pub fn new() -> Self {
        Self {
            last_pose: None,
            is_tracking: false,
            anchor: Anchor::None,
        }
    }

    pub fn last_pose(&self) -> Option<Pose> {
        self.last_pose
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub fn anchor(&self) -> Option<Pose> {
        match self.anchor {
            Anchor::Set(pose) => Some(pose),
            _ => None,
        }
    }

    /// Use the next frame's pose as the anchor.
    pub fn set_anchor(&mut self) {
        self.anchor = Anchor::Armed;
    }

    pub fn clear_anchor(&mut self) {
        self.anchor = Anchor::None;
    }

    /// Feed the current frame's pose and tracking state.
    pub fn update(&mut self, pose: Pose, state: TrackingState) -> PoseDelta {
        let delta = self.measure(pose, state);
        self.commit(pose);
        delta
    }

    /// Update the tracking flag and measure distances without moving the last pose.
    ///
    /// Pair with [`commit`](Self::commit) once the rest of the frame succeeded.
    pub fn measure(&mut self, pose: Pose, state: TrackingState) -> PoseDelta {
        let was_tracking = self.is_tracking;
        self.is_tracking = state.is_tracking();

        let start = self.last_pose.unwrap_or(pose);
        let distance_m = start.distance_to(&pose);

        if self.anchor == Anchor::Armed {
            self.anchor = Anchor::Set(pose);
        }
        let anchor_distance_m = self.anchor().map(|anchor| anchor.distance_to(&pose));

        PoseDelta {
            distance_m,
            anchor_distance_m,
            is_tracking: self.is_tracking,
            tracking_changed: self.is_tracking != was_tracking,
        }
    }

    /// Record `pose` as the starting point for the next frame's distance.
    pub fn commit(&mut self, pose: Pose) {
        self.last_pose = Some(pose);
    }
}
