/// Camera pose snapshot supplied by the host for one frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Translation in meters [x, y, z].
    pub translation: [f64; 3],
    /// Orientation quaternion [qx, qy, qz, qw]. Carried through, never used for distance.
    pub quaternion: [f64; 4],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: [0.0; 3],
        quaternion: [0.0, 0.0, 0.0, 1.0],
    };

    /// Pose at the given position with identity orientation.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Pose {
            translation: [x, y, z],
            ..Pose::IDENTITY
        }
    }

    pub fn x(&self) -> f64 {
        self.translation[0]
    }

    pub fn y(&self) -> f64 {
        self.translation[1]
    }

    pub fn z(&self) -> f64 {
        self.translation[2]
    }

    /// Euclidean distance in meters between the two translations.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        let dz = self.z() - other.z();
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

/// Host-reported camera tracking state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    Tracking = 0,
    #[default]
    Paused = 1,
    Stopped = 2,
}

impl TrackingState {
    pub fn is_tracking(self) -> bool {
        self == TrackingState::Tracking
    }

    /// Map a C ABI code. Unknown codes are treated as stopped.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TrackingState::Tracking,
            1 => TrackingState::Paused,
            _ => TrackingState::Stopped,
        }
    }
}

bitflags::bitflags! {
    /// What happened during one frame update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(C)]
    pub struct UpdateEvents: u32 {
        const TRACKING_STARTED = 1 << 0;
        const TRACKING_STOPPED = 1 << 1;
        const IMAGE_PACKED     = 1 << 2;
        const IMAGE_NOT_READY  = 1 << 3;
        const BUFFER_GROWN     = 1 << 4;
        const NO_FRAME         = 1 << 5;
    }
}

impl Default for UpdateEvents {
    fn default() -> Self {
        UpdateEvents::empty()
    }
}

/// Report returned by [`FrameSession::on_frame_update`](crate::FrameSession::on_frame_update).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameUpdate {
    /// Host timestamp in nanoseconds, `None` when no frame was available.
    pub timestamp_ns: Option<i64>,
    /// Distance moved since the previous frame, in meters.
    pub distance_m: Option<f64>,
    /// Distance from the anchor pose, when an anchor is set.
    pub anchor_distance_m: Option<f64>,
    /// Readable bytes in the packed buffer after this update.
    pub packed_len: usize,
    pub events: UpdateEvents,
}

impl FrameUpdate {
    /// True only on the frame where tracking starts or stops.
    pub fn tracking_changed(&self) -> bool {
        self.events
            .intersects(UpdateEvents::TRACKING_STARTED | UpdateEvents::TRACKING_STOPPED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_three_four_five() {
        let start = Pose::from_translation(0.0, 0.0, 0.0);
        let end = Pose::from_translation(3.0, 4.0, 0.0);
        assert!((start.distance_to(&end) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_symmetric_and_zero_on_self() {
        let a = Pose::from_translation(0.25, -1.5, 2.0);
        let b = Pose::from_translation(-0.75, 0.5, 1.0);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_distance_ignores_orientation() {
        let a = Pose::from_translation(1.0, 0.0, 0.0);
        let b = Pose {
            quaternion: [0.0, 0.7071, 0.0, 0.7071],
            ..a
        };
        assert_eq!(a.distance_to(&b), 0.0);
    }

    #[test]
    fn test_tracking_state_codes() {
        assert_eq!(TrackingState::from_code(0), TrackingState::Tracking);
        assert_eq!(TrackingState::from_code(1), TrackingState::Paused);
        assert_eq!(TrackingState::from_code(2), TrackingState::Stopped);
        assert_eq!(TrackingState::from_code(42), TrackingState::Stopped);
        assert!(TrackingState::Tracking.is_tracking());
        assert!(!TrackingState::Paused.is_tracking());
    }

    #[test]
    fn test_tracking_changed_flags() {
        let mut update = FrameUpdate::default();
        assert!(!update.tracking_changed());
        update.events |= UpdateEvents::IMAGE_PACKED;
        assert!(!update.tracking_changed());
        update.events |= UpdateEvents::TRACKING_STOPPED;
        assert!(update.tracking_changed());
    }
}
