//! Twinview Core - operator console logic for a live/simulated robot rig
//!
//! This crate holds everything the front-end decides without touching a
//! window or a socket:
//! - Pose values and the `PoseSource` seam the network receiver plugs into
//! - Viewport geometry and the camera model used by both views
//! - The viewport/camera arbitrator (which camera owns the pointer)
//! - The interactive target handle and the view preset engine
//! - Trigger bindings and the per-tick frame loop that feeds the motion system

pub mod arbitrator;
pub mod camera;
pub mod console;
pub mod frame;
pub mod handle;
pub mod motion;
pub mod pose;
pub mod preset;
pub mod trigger;
pub mod viewport;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown view preset: {0}")]
    UnknownPreset(u8),
    #[error("Unknown trigger name: {0}")]
    UnknownTrigger(String),
    #[error("Invalid key binding for {trigger}: {key:?}")]
    InvalidKeyBinding { trigger: String, key: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

pub use arbitrator::{Arbitrator, InputFocus};
pub use camera::{Camera, CAMERA_UP};
pub use console::{Console, TriggerTable};
pub use frame::{FrameLoop, TickReport};
pub use handle::{HandleMode, TargetHandle};
pub use motion::{LoopbackMotion, MotionSystem, RateMeter};
pub use pose::{Pose, PoseSource, QueuedPoses, TargetPose};
pub use preset::{LookAtTarget, PresetEngine, ViewPreset};
pub use trigger::{KeyBindings, Trigger};
pub use viewport::{ViewRect, ViewSplit, Viewport, ViewportId, ViewportLayout};
