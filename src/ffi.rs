//! C FFI layer for arframe.
//!
//! Lets a native AR host (JNI glue, C/C++ engine) drive a [`FrameSession`].
//! The host describes each frame with an [`AfFrame`] whose plane pointers stay
//! valid for the duration of the call; the generated C header is written to
//! `include/arframe.h` by cbindgen.
//!
//! A session handle must not be used from two threads at once.

use crate::error::{ArFrameError, LastError};
use crate::host::{ArFrame, CameraImage};
use crate::session::FrameSession;
use crate::types::{Pose, TrackingState, UpdateEvents};
use crate::{Result, SessionConfig};
use std::cell::Cell;
use std::ffi::{c_char, c_int, c_void};

/// Last error message for C consumers.
static LAST_ERROR: LastError = LastError::new();

/// `AfFrame::image_status`: image ready, planes are valid.
pub const AF_IMAGE_READY: c_int = 0;
/// `AfFrame::image_status`: image still capturing, skip packing.
pub const AF_IMAGE_NOT_YET_AVAILABLE: c_int = 1;
/// `AfFrame::image_status`: acquisition failed on the host side.
pub const AF_IMAGE_FAILED: c_int = 2;

/// Opaque session handle for C consumers.
pub struct AfSession(FrameSession);

/// One contiguous byte plane of a camera image.
#[repr(C)]
pub struct AfPlane {
    pub data: *const u8,
    pub len: usize,
}

/// Called exactly once per frame whose image was acquired (status `AF_IMAGE_READY`).
pub type AfReleaseFn = Option<unsafe extern "C" fn(user_data: *mut c_void)>;

/// Frame description filled by the host.
#[repr(C)]
pub struct AfFrame {
    /// Translation [x, y, z] in meters.
    pub translation: [f64; 3],
    /// Quaternion [qx, qy, qz, qw].
    pub quaternion: [f64; 4],
    /// 0 = tracking, 1 = paused, 2 = stopped.
    pub tracking_state: c_int,
    pub timestamp_ns: i64,
    /// One of the `AF_IMAGE_*` constants.
    pub image_status: c_int,
    /// Planes in order Y, U, V. Only Y and U are read.
    pub planes: *const AfPlane,
    pub plane_count: usize,
    pub release: AfReleaseFn,
    pub release_user_data: *mut c_void,
}

/// Per-frame report in C-compatible layout.
#[repr(C)]
#[derive(Debug, Default)]
pub struct AfFrameUpdate {
    pub timestamp_ns: i64,
    /// Distance moved since the previous frame, in meters (0 when no frame).
    pub distance_m: f64,
    pub has_anchor: bool,
    pub anchor_distance_m: f64,
    pub packed_len: usize,
    /// `UpdateEvents` bits.
    pub events: u32,
}

/// Owns the host's release callback until an image takes it over. A READY
/// image that is never acquired is released when the frame goes out of scope.
struct FfiFrame<'a> {
    frame: &'a AfFrame,
    release: Cell<AfReleaseFn>,
}

impl<'a> FfiFrame<'a> {
    fn new(frame: &'a AfFrame) -> Self {
        let release = if frame.image_status == AF_IMAGE_READY {
            frame.release
        } else {
            None
        };
        Self {
            frame,
            release: Cell::new(release),
        }
    }
}

impl Drop for FfiFrame<'_> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            unsafe { release(self.frame.release_user_data) };
        }
    }
}

impl<'a> ArFrame for FfiFrame<'a> {
    type Image = FfiImage<'a>;

    fn pose(&self) -> Pose {
        Pose {
            translation: self.frame.translation,
            quaternion: self.frame.quaternion,
        }
    }

    fn tracking_state(&self) -> TrackingState {
        TrackingState::from_code(self.frame.tracking_state)
    }

    fn timestamp_ns(&self) -> i64 {
        self.frame.timestamp_ns
    }

    fn acquire_camera_image(&self) -> Result<FfiImage<'a>> {
        match self.frame.image_status {
            AF_IMAGE_READY => {
                let planes = if self.frame.planes.is_null() || self.frame.plane_count == 0 {
                    &[][..]
                } else {
                    // Caller of af_session_on_frame_update guarantees the array.
                    unsafe { std::slice::from_raw_parts(self.frame.planes, self.frame.plane_count) }
                };
                Ok(FfiImage {
                    planes,
                    release: self.release.take(),
                    user_data: self.frame.release_user_data,
                })
            }
            AF_IMAGE_NOT_YET_AVAILABLE => Err(ArFrameError::NotYetAvailable),
            status => Err(ArFrameError::Host(format!(
                "image acquisition failed (status {})",
                status
            ))),
        }
    }
}

struct FfiImage<'a> {
    planes: &'a [AfPlane],
    release: AfReleaseFn,
    user_data: *mut c_void,
}

impl CameraImage for FfiImage<'_> {
    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn plane(&self, index: usize) -> Option<&[u8]> {
        let plane = self.planes.get(index)?;
        if plane.data.is_null() {
            return (plane.len == 0).then_some(&[][..]);
        }
        // Plane memory is host-owned and valid until the release callback runs.
        Some(unsafe { std::slice::from_raw_parts(plane.data, plane.len) })
    }

    fn close(&mut self) {
        if let Some(release) = self.release.take() {
            unsafe { release(self.user_data) };
        }
    }
}

/// Create a session configured from `ARFRAME_*` environment variables.
#[no_mangle]
pub extern "C" fn af_session_new() -> *mut AfSession {
    Box::into_raw(Box::new(AfSession(FrameSession::new(SessionConfig::from_env()))))
}

/// Create a session with an explicit initial packed-buffer capacity.
#[no_mangle]
pub extern "C" fn af_session_new_with_capacity(initial_capacity: usize) -> *mut AfSession {
    let config = SessionConfig::from_env().with_initial_buffer_capacity(initial_capacity);
    Box::into_raw(Box::new(AfSession(FrameSession::new(config))))
}

/// Free a session.
///
/// # Safety
/// `session` must be a pointer returned by `af_session_new*`, or null.
#[no_mangle]
pub unsafe extern "C" fn af_session_free(session: *mut AfSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Process one host tick. A null `frame` means the host had no frame.
///
/// Returns 1 if tracking started or stopped on this tick, 0 if not, -1 on
/// error (check `af_last_error()`). `out` may be null.
///
/// # Safety
/// `session` must be a valid session pointer. `frame`, if not null, must point
/// to a valid `AfFrame` whose `planes` array and plane data stay valid for the
/// duration of the call. `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn af_session_on_frame_update(
    session: *mut AfSession,
    frame: *const AfFrame,
    out: *mut AfFrameUpdate,
) -> c_int {
    if session.is_null() {
        LAST_ERROR.set(&ArFrameError::Host("null session".into()));
        return -1;
    }
    let session = &mut *session;

    let result = if frame.is_null() {
        Ok(session.0.on_no_frame())
    } else {
        let frame = FfiFrame::new(&*frame);
        session.0.on_frame_update(Some(&frame))
    };

    match result {
        Ok(update) => {
            if !out.is_null() {
                out.write(AfFrameUpdate {
                    timestamp_ns: update.timestamp_ns.unwrap_or(0),
                    distance_m: update.distance_m.unwrap_or(0.0),
                    has_anchor: update.anchor_distance_m.is_some(),
                    anchor_distance_m: update.anchor_distance_m.unwrap_or(0.0),
                    packed_len: update.packed_len,
                    events: update.events.bits(),
                });
            }
            c_int::from(update.tracking_changed())
        }
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Pointer to the packed Y+U bytes of the last packed image, valid until the
/// next call on this session. Writes the length to `out_len` if not null.
///
/// # Safety
/// `session` must be a valid session pointer, or null. `out_len` must be null
/// or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn af_session_packed_data(
    session: *const AfSession,
    out_len: *mut usize,
) -> *const u8 {
    if session.is_null() {
        if !out_len.is_null() {
            out_len.write(0);
        }
        return std::ptr::null();
    }
    let data = (*session).0.packed_data();
    if !out_len.is_null() {
        out_len.write(data.len());
    }
    data.as_ptr()
}

/// Use the next frame's pose as the anchor for distance reporting.
///
/// # Safety
/// `session` must be a valid session pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn af_session_set_anchor(session: *mut AfSession) {
    if let Some(session) = session.as_mut() {
        session.0.set_anchor();
    }
}

/// Stop reporting anchor distance.
///
/// # Safety
/// `session` must be a valid session pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn af_session_clear_anchor(session: *mut AfSession) {
    if let Some(session) = session.as_mut() {
        session.0.clear_anchor();
    }
}

/// Whether `events` (from `AfFrameUpdate`) include a tracking start or stop.
#[no_mangle]
pub extern "C" fn af_events_tracking_changed(events: u32) -> bool {
    UpdateEvents::from_bits_truncate(events)
        .intersects(UpdateEvents::TRACKING_STARTED | UpdateEvents::TRACKING_STOPPED)
}

/// Get the last error message. Returns NULL if no error.
/// The returned pointer is valid until the next arframe API call.
#[no_mangle]
pub extern "C" fn af_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}
