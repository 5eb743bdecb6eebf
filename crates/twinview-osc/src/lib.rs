//! Twinview OSC - network plumbing for the operator front-end
//!
//! - `receiver`: binds the pose stream port and queues incoming messages from
//!   a delivery thread; the frame loop drains the queue once per tick
//! - `decode`: OSC message to `Pose` conversion
//! - `bridge`: a `MotionSystem` that forwards poses and targets to an
//!   external motion process over UDP

pub mod bridge;
pub mod decode;
pub mod receiver;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OscError {
    #[error("Failed to bind OSC socket on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("OSC I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OSC encode error: {0}")]
    Encode(#[from] rosc::OscError),
    #[error("Invalid OSC address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, OscError>;

pub use bridge::OscMotionBridge;
pub use decode::{coerce_arg, decode_pose};
pub use receiver::{PoseReceiver, DEFAULT_POSE_PORT};
