//! # arframe - per-frame AR camera processing
//!
//! A small library an AR host calls once per rendered frame. Provides:
//! - Pose-delta tracking (distance moved since last frame, tracking transitions)
//! - Packing of the luminance and chroma-U camera planes into a reusable buffer
//! - C FFI so native hosts (JNI glue, C/C++ engines) can drive a session
//!
//! The AR runtime itself is an external collaborator, seen only through the
//! [`ArFrame`] and [`CameraImage`] traits.
//!
//! ## Quick Start
//! ```
//! use arframe::sim::{walk, WalkParams};
//! use arframe::{FrameSession, SessionConfig};
//!
//! let mut session = FrameSession::new(SessionConfig::default());
//! for frame in walk(&WalkParams::default()) {
//!     let update = session.on_frame_update(Some(&frame)).unwrap();
//!     println!("moved {:.3} m, {} bytes packed", update.distance_m.unwrap_or(0.0), update.packed_len);
//! }
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod host;
pub mod packer;
pub mod session;
pub mod sim;
pub mod tracker;
pub mod types;

pub use config::SessionConfig;
pub use error::ArFrameError;
pub use host::{ArFrame, CameraImage, ImageGuard};
pub use packer::{PackedBuffer, PlanePacker};
pub use session::FrameSession;
pub use tracker::PoseDeltaTracker;
pub use types::*;

/// Result type alias for arframe operations.
pub type Result<T> = std::result::Result<T, ArFrameError>;
