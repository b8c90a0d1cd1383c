//! Service Layer
//!
//! The in-process boundary an HTTP layer would sit on. Non-deterministic
//! (tokio); all match logic runs through `game/`.

pub mod platform;
pub mod protocol;

pub use platform::{spawn, spawn_with_depth, PlatformHandle, ServiceError, DEFAULT_QUEUE_DEPTH};
pub use protocol::{ApiResponse, EscrowView, PlatformRequest};
