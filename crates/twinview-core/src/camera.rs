//! Orbit camera model shared by both viewports

use glam::{Mat3, Quat, Vec2, Vec3};

use crate::viewport::ViewRect;

/// World "up" for every camera in the rig (Z-up robot frame)
pub const CAMERA_UP: Vec3 = Vec3::Z;

/// Where a freshly reset camera sits: high above the origin, nudged off-axis
/// so the look-at basis stays well defined with a Z up vector.
pub const DEFAULT_EYE: Vec3 = Vec3::new(-1.0, 1.0, 2500.0);

const MIN_DISTANCE: f32 = 10.0;

/// A steerable camera: transform, orbit pivot and pointer-input flag
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Point the camera orbits around and dollies toward
    pub target: Vec3,
    input_enabled: bool,
    pub sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: DEFAULT_EYE,
            orientation: Quat::IDENTITY,
            target: Vec3::ZERO,
            input_enabled: false,
            sensitivity: 0.005,
            zoom_speed: 0.1,
        };
        camera.look_at(Vec3::ZERO, CAMERA_UP);
        camera
    }
}

impl Camera {
    /// Back to the default framing. The input flag is owned by the
    /// arbitrator and survives a reset.
    pub fn reset(&mut self) {
        let input_enabled = self.input_enabled;
        *self = Self {
            input_enabled,
            sensitivity: self.sensitivity,
            zoom_speed: self.zoom_speed,
            ..Self::default()
        };
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Turn to face `target` keeping `up` as close to screen-up as possible
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.orientation = looking_at(self.position, target, up);
        self.target = target;
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub(crate) fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    /// Direction the camera looks along (-Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Rotate around the pivot: horizontal motion yaws about world up,
    /// vertical motion pitches about the camera's right axis.
    pub fn orbit(&mut self, delta: Vec2) {
        let yaw = Quat::from_axis_angle(CAMERA_UP, -delta.x * self.sensitivity);
        let pitch = Quat::from_axis_angle(self.right(), -delta.y * self.sensitivity);
        let rotation = yaw * pitch;

        let offset = self.position - self.target;
        self.position = self.target + rotation * offset;
        self.orientation = (rotation * self.orientation).normalize();
    }

    /// Slide camera and pivot together in the view plane
    pub fn pan(&mut self, delta: Vec2) {
        let speed = self.distance() * 0.002;
        let shift = (-self.right() * delta.x + self.up() * delta.y) * speed;
        self.position += shift;
        self.target += shift;
    }

    /// Move toward (positive scroll) or away from the pivot
    pub fn dolly(&mut self, scroll: f32) {
        let distance = self.distance();
        let new_distance = (distance * (1.0 - scroll * self.zoom_speed)).max(MIN_DISTANCE);
        let back = (self.position - self.target)
            .try_normalize()
            .unwrap_or(-self.forward());
        self.position = self.target + back * new_distance;
    }

    /// Window position of `point` rendered into `rect` with vertical field
    /// of view `fov_y` (radians). `None` for points behind the camera.
    pub fn project(&self, point: Vec3, rect: &ViewRect, fov_y: f32) -> Option<Vec2> {
        let local = self.orientation.inverse() * (point - self.position);
        if local.z >= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let depth = -local.z;
        let half_height = (fov_y / 2.0).tan() * depth;
        let half_width = half_height * rect.width / rect.height;
        let ndc = Vec2::new(local.x / half_width, local.y / half_height);
        Some(Vec2::new(
            rect.x + (ndc.x + 1.0) * 0.5 * rect.width,
            rect.y + (1.0 - ndc.y) * 0.5 * rect.height,
        ))
    }
}

/// Rotation whose -Z axis points from `eye` to `target`.
///
/// Degenerate inputs (eye on target, or view direction parallel to `up`)
/// fall back to an arbitrary orthonormal basis instead of producing NaNs.
pub fn looking_at(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    let back = (eye - target).try_normalize().unwrap_or(Vec3::Z);
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    let right = up
        .cross(back)
        .try_normalize()
        .unwrap_or_else(|| up.any_orthonormal_vector());
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}
