use crate::error::ArFrameError;
use crate::host::{ArFrame, CameraImage, ImageGuard};
use crate::Result;

/// Plane index of the luminance (Y) data.
pub const PLANE_Y: usize = 0;
/// Plane index of the blue-difference chroma (U) data.
pub const PLANE_U: usize = 1;

/// Reusable byte buffer with position/limit cursor semantics.
///
/// Writing happens between [`clear`](Self::clear) and [`flip`](Self::flip);
/// afterwards [`as_slice`](Self::as_slice) exposes exactly the bytes written.
#[derive(Debug, Clone)]
pub struct PackedBuffer {
    storage: Box<[u8]>,
    position: usize,
    limit: usize,
}

impl PackedBuffer {
    /// New buffer with nothing readable yet.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            position: 0,
            limit: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes between position and limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Rewind for writing: position 0, limit at capacity. Content is not zeroed.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.storage.len();
    }

    pub fn put(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining() {
            return Err(ArFrameError::BufferOverflow {
                needed: bytes.len(),
                remaining: self.remaining(),
            });
        }
        let end = self.position + bytes.len();
        self.storage[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }

    /// Switch to reading: limit at the write position, position 0.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Readable bytes (position..limit).
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.position..self.limit]
    }
}

/// Outcome of one [`PlanePacker::pack`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackOutcome {
    Packed { len: usize, grown: bool },
    /// The host had no image ready; the buffer was left untouched.
    NotYetAvailable,
}

/// Copies the Y and U planes of each frame's camera image into one buffer.
///
/// Plane 2 (V) is not copied.
#[derive(Debug, Clone)]
pub struct PlanePacker {
    buffer: PackedBuffer,
}

impl PlanePacker {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            buffer: PackedBuffer::with_capacity(initial_capacity),
        }
    }

    pub fn buffer(&self) -> &PackedBuffer {
        &self.buffer
    }

    /// Acquire the frame's image and pack it. Image absence is a skip, not an error.
    pub fn pack<F: ArFrame>(&mut self, frame: &F) -> Result<PackOutcome> {
        let image = match frame.acquire_camera_image() {
            Ok(image) => image,
            Err(ArFrameError::NotYetAvailable) => {
                log::warn!("Camera image not yet available, skipping pack");
                return Ok(PackOutcome::NotYetAvailable);
            }
            Err(e) => return Err(e),
        };
        let image = ImageGuard::new(image);
        let outcome = self.pack_image(&*image)?;
        image.release();
        Ok(outcome)
    }

    /// Pack an already acquired image. The caller keeps ownership and must close it.
    pub fn pack_image<I: CameraImage>(&mut self, image: &I) -> Result<PackOutcome> {
        let luminance = plane(image, PLANE_Y)?;
        let chroma_u = plane(image, PLANE_U)?;
        let image_size = luminance.len() + chroma_u.len();

        self.buffer.clear();
        let grown = self.buffer.remaining() < image_size;
        if grown {
            log::debug!(
                "Growing packed buffer {} -> {} bytes",
                self.buffer.capacity(),
                image_size
            );
            self.buffer = PackedBuffer::with_capacity(image_size);
            self.buffer.clear();
        }
        self.buffer.put(luminance)?;
        self.buffer.put(chroma_u)?;
        self.buffer.flip();

        log::trace!(
            "Packed Y={} U={} bytes (capacity {})",
            luminance.len(),
            chroma_u.len(),
            self.buffer.capacity()
        );

        Ok(PackOutcome::Packed {
            len: image_size,
            grown,
        })
    }
}

fn plane<I: CameraImage>(image: &I, index: usize) -> Result<&[u8]> {
    image.plane(index).ok_or(ArFrameError::MissingPlane {
        index,
        available: image.plane_count(),
    })
}
