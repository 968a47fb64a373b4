//! Contracts consumed from the AR host.
//!
//! The host owns session lifecycle, tracking and rendering. This crate only
//! sees one frame at a time through [`ArFrame`], and the camera image behind
//! it through [`CameraImage`].

use crate::types::{Pose, TrackingState};
use crate::Result;
use std::ops::Deref;

/// One per-update snapshot from the host. Not retained past the update.
pub trait ArFrame {
    type Image: CameraImage;

    fn pose(&self) -> Pose;

    fn tracking_state(&self) -> TrackingState;

    /// Monotonically increasing frame timestamp in nanoseconds.
    fn timestamp_ns(&self) -> i64;

    /// Acquire this frame's camera image.
    ///
    /// Returns `Err(ArFrameError::NotYetAvailable)` while the image is still
    /// being captured. Any image returned must be closed exactly once.
    fn acquire_camera_image(&self) -> Result<Self::Image>;
}

/// Host-owned camera image with separate byte planes (0 = Y, 1 = U, 2 = V).
pub trait CameraImage {
    fn plane_count(&self) -> usize;

    fn plane(&self, index: usize) -> Option<&[u8]>;

    /// Return the image to the host's pool.
    fn close(&mut self);
}

/// Scope guard that closes an acquired image exactly once, on every exit path.
pub struct ImageGuard<I: CameraImage> {
    image: Option<I>,
}

impl<I: CameraImage> ImageGuard<I> {
    pub fn new(image: I) -> Self {
        Self { image: Some(image) }
    }

    /// Close the image now instead of at end of scope.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if let Some(mut image) = self.image.take() {
            image.close();
        }
    }
}

impl<I: CameraImage> Deref for ImageGuard<I> {
    type Target = I;

    fn deref(&self) -> &I {
        // Only `release` and `drop` take the image, and both consume the guard.
        match self.image.as_ref() {
            Some(image) => image,
            None => unreachable!("image guard used after release"),
        }
    }
}

impl<I: CameraImage> Drop for ImageGuard<I> {
    fn drop(&mut self) {
        self.close_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingImage {
        planes: Vec<Vec<u8>>,
        closes: Rc<Cell<usize>>,
    }

    impl CameraImage for CountingImage {
        fn plane_count(&self) -> usize {
            self.planes.len()
        }

        fn plane(&self, index: usize) -> Option<&[u8]> {
            self.planes.get(index).map(Vec::as_slice)
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    fn image(closes: &Rc<Cell<usize>>) -> CountingImage {
        CountingImage {
            planes: vec![vec![1, 2, 3]],
            closes: closes.clone(),
        }
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let closes = Rc::new(Cell::new(0));
        {
            let guard = ImageGuard::new(image(&closes));
            assert_eq!(guard.plane(0), Some(&[1u8, 2, 3][..]));
            assert_eq!(closes.get(), 0);
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_guard_explicit_release_closes_once() {
        let closes = Rc::new(Cell::new(0));
        let guard = ImageGuard::new(image(&closes));
        guard.release();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_guard_closes_on_early_return() {
        fn read_missing_plane(guard: ImageGuard<CountingImage>) -> Option<usize> {
            let plane = guard.plane(1)?;
            Some(plane.len())
        }

        let closes = Rc::new(Cell::new(0));
        assert_eq!(read_missing_plane(ImageGuard::new(image(&closes))), None);
        assert_eq!(closes.get(), 1);
    }
}
