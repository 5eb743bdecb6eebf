//! Interactive target handle
//!
//! The handle wraps the target pose node. Drags are applied straight to the
//! node, so whatever the frame loop reads next tick is the edited pose.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Camera;
use crate::pose::TargetPose;
use crate::viewport::ViewRect;

const ROTATE_RADIANS_PER_PIXEL: f32 = 0.01;
const SCALE_PER_PIXEL: f32 = 0.005;
const MIN_SCALE: f32 = 0.01;
const GRAB_RADIUS_PX: f32 = 16.0;

/// What a drag on the handle does to the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl std::fmt::Display for HandleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleMode::Translate => write!(f, "translate"),
            HandleMode::Rotate => write!(f, "rotate"),
            HandleMode::Scale => write!(f, "scale"),
        }
    }
}

/// Screen-to-world mapping for one drag, taken from the sim camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragView {
    pub right: Vec3,
    pub up: Vec3,
    /// World units covered by one screen pixel at the node's depth
    pub units_per_pixel: f32,
}

impl DragView {
    /// Build the mapping for a perspective camera with vertical field of view
    /// `fov_y` (radians) rendering into a viewport `viewport_height` pixels tall.
    pub fn new(camera: &Camera, node: Vec3, fov_y: f32, viewport_height: f32) -> Self {
        let depth = (node - camera.position).dot(camera.forward()).abs();
        let units_per_pixel = if viewport_height > 0.0 {
            2.0 * depth * (fov_y / 2.0).tan() / viewport_height
        } else {
            0.0
        };
        Self {
            right: camera.right(),
            up: camera.up(),
            units_per_pixel,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetHandle {
    node: TargetPose,
    scale: Vec3,
    mode: HandleMode,
    visible: bool,
    interacting: bool,
    display_scale: f32,
}

impl Default for TargetHandle {
    fn default() -> Self {
        Self::new(TargetPose::default(), 2.0)
    }
}

impl TargetHandle {
    pub fn new(node: TargetPose, display_scale: f32) -> Self {
        Self {
            node,
            scale: Vec3::ONE,
            mode: HandleMode::default(),
            visible: true,
            interacting: false,
            display_scale,
        }
    }

    /// Current target pose as consumed downstream
    pub fn target(&self) -> TargetPose {
        self.node
    }

    pub fn set_target(&mut self, target: TargetPose) {
        self.node = target;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn mode(&self) -> HandleMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: HandleMode) {
        if self.mode != mode {
            debug!(%mode, "Handle mode changed");
        }
        self.mode = mode;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hiding the handle also ends any drag in progress
    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
        if !self.visible {
            self.interacting = false;
        }
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    /// Screen radius around the node centre that grabs the handle
    pub fn grab_radius(&self) -> f32 {
        GRAB_RADIUS_PX * self.display_scale
    }

    /// Whether a press at `pointer` lands on the handle as seen by `camera`
    /// rendering into `rect`
    pub fn hit_test(&self, camera: &Camera, rect: &ViewRect, fov_y: f32, pointer: Vec2) -> bool {
        if !self.visible {
            return false;
        }
        camera
            .project(self.node.position, rect, fov_y)
            .is_some_and(|centre| centre.distance(pointer) <= self.grab_radius())
    }

    /// Start a drag. A hidden handle cannot be grabbed.
    pub fn begin_drag(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        self.interacting = true;
        true
    }

    pub fn end_drag(&mut self) {
        self.interacting = false;
    }

    /// Apply one pointer motion step (screen pixels, y down) in the current mode
    pub fn drag(&mut self, delta: Vec2, view: &DragView) {
        if !self.interacting {
            return;
        }
        match self.mode {
            HandleMode::Translate => {
                let shift = (view.right * delta.x - view.up * delta.y) * view.units_per_pixel;
                self.node.position += shift;
            }
            HandleMode::Rotate => {
                let yaw = Quat::from_axis_angle(view.up, delta.x * ROTATE_RADIANS_PER_PIXEL);
                let pitch = Quat::from_axis_angle(view.right, delta.y * ROTATE_RADIANS_PER_PIXEL);
                self.node.orientation = (yaw * pitch * self.node.orientation).normalize();
            }
            HandleMode::Scale => {
                let factor = 1.0 - delta.y * SCALE_PER_PIXEL;
                self.scale = (self.scale * factor).max(Vec3::splat(MIN_SCALE));
            }
        }
    }
}
