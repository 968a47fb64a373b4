use std::fmt;

/// Errors that can occur while processing a host frame.
#[derive(Debug, thiserror::Error)]
pub enum ArFrameError {
    /// The frame's camera image has not finished capturing. Expected and
    /// transient; the packer treats it as a skip.
    #[error("Camera image not yet available")]
    NotYetAvailable,

    #[error("Camera image has no plane {index} ({available} plane(s) available)")]
    MissingPlane { index: usize, available: usize },

    #[error("Packed buffer overflow: need {needed} bytes, {remaining} remaining")]
    BufferOverflow { needed: usize, remaining: usize },

    #[error("Host error: {0}")]
    Host(String),

    #[error("Frame stream stopped")]
    StreamStopped,

    #[error("Timeout waiting for frame")]
    Timeout,
}

impl ArFrameError {
    /// True for the one acquisition failure the packer skips instead of propagating.
    pub fn is_not_yet_available(&self) -> bool {
        matches!(self, ArFrameError::NotYetAvailable)
    }
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &ArFrameError) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}
