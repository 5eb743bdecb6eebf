//! Canonical camera framings applied on a key press

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::{Camera, CAMERA_UP};
use crate::{CoreError, Result};

/// Default eye distance for every preset, in scene units (mm)
pub const DEFAULT_PRESET_DISTANCE: f32 = 2500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewPreset {
    Top,
    Left,
    Front,
    Perspective,
    PerspectiveOpposite,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 5] = [
        ViewPreset::Top,
        ViewPreset::Left,
        ViewPreset::Front,
        ViewPreset::Perspective,
        ViewPreset::PerspectiveOpposite,
    ];

    /// Preset bound to trigger number 1-5
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1 => Ok(ViewPreset::Top),
            2 => Ok(ViewPreset::Left),
            3 => Ok(ViewPreset::Front),
            4 => Ok(ViewPreset::Perspective),
            5 => Ok(ViewPreset::PerspectiveOpposite),
            other => Err(CoreError::UnknownPreset(other)),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            ViewPreset::Top => 1,
            ViewPreset::Left => 2,
            ViewPreset::Front => 3,
            ViewPreset::Perspective => 4,
            ViewPreset::PerspectiveOpposite => 5,
        }
    }

    /// Eye offset from the look-at point. The ±1 components keep the view
    /// direction off the up axis.
    pub fn offset(&self, distance: f32) -> Vec3 {
        match self {
            ViewPreset::Top => Vec3::new(-1.0, 1.0, distance),
            ViewPreset::Left => Vec3::new(distance, 1.0, 1.0),
            ViewPreset::Front => Vec3::new(1.0, distance, 1.0),
            ViewPreset::Perspective => Vec3::new(distance / 4.0, distance, distance / 4.0),
            ViewPreset::PerspectiveOpposite => {
                Vec3::new(-distance / 4.0, distance, -distance / 4.0)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewPreset::Top => "TOP VIEW",
            ViewPreset::Left => "LEFT VIEW",
            ViewPreset::Front => "FRONT VIEW",
            ViewPreset::Perspective | ViewPreset::PerspectiveOpposite => "PERSPECTIVE VIEW",
        }
    }
}

/// What preset cameras are centred on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookAtTarget {
    Origin,
    #[default]
    TargetNode,
}

impl LookAtTarget {
    pub fn toggled(&self) -> Self {
        match self {
            LookAtTarget::Origin => LookAtTarget::TargetNode,
            LookAtTarget::TargetNode => LookAtTarget::Origin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetEngine {
    pub distance: f32,
    pub look_at: LookAtTarget,
}

impl Default for PresetEngine {
    fn default() -> Self {
        Self {
            distance: DEFAULT_PRESET_DISTANCE,
            look_at: LookAtTarget::default(),
        }
    }
}

impl PresetEngine {
    pub fn new(distance: f32, look_at: LookAtTarget) -> Self {
        Self { distance, look_at }
    }

    pub fn toggle_look_at(&mut self) {
        self.look_at = self.look_at.toggled();
    }

    /// Point the preset frames, given the target node's current position
    pub fn focus_point(&self, target_position: Vec3) -> Vec3 {
        match self.look_at {
            LookAtTarget::Origin => Vec3::ZERO,
            LookAtTarget::TargetNode => target_position,
        }
    }

    /// Jump `camera` to the preset framing and return the viewport label.
    /// No interpolation: the camera lands in one step.
    pub fn apply(&self, preset: ViewPreset, camera: &mut Camera, target_position: Vec3) -> &'static str {
        let focus = self.focus_point(target_position);
        camera.reset();
        camera.set_position(focus + preset.offset(self.distance));
        camera.look_at(focus, CAMERA_UP);
        debug!(preset = preset.label(), ?focus, "Applied view preset");
        preset.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_numbers() {
        for preset in ViewPreset::ALL {
            assert_eq!(ViewPreset::from_number(preset.number()), Ok(preset));
        }
        assert_eq!(ViewPreset::from_number(0), Err(CoreError::UnknownPreset(0)));
        assert_eq!(ViewPreset::from_number(6), Err(CoreError::UnknownPreset(6)));
    }

    #[test]
    fn test_top_view_on_origin() {
        let engine = PresetEngine::new(2500.0, LookAtTarget::Origin);
        let mut camera = Camera::default();
        camera.orbit(glam::Vec2::new(200.0, 80.0));

        let label = engine.apply(ViewPreset::Top, &mut camera, Vec3::new(500.0, 500.0, 500.0));
        assert_eq!(label, "TOP VIEW");
        assert_eq!(camera.position, Vec3::new(-1.0, 1.0, 2500.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera
            .forward()
            .abs_diff_eq(Vec3::new(1.0, -1.0, -2500.0).normalize(), 1e-5));
    }

    #[test]
    fn test_preset_centred_on_target() {
        let engine = PresetEngine::new(2500.0, LookAtTarget::TargetNode);
        let mut camera = Camera::default();
        let target = Vec3::new(100.0, 200.0, 300.0);

        let label = engine.apply(ViewPreset::Left, &mut camera, target);
        assert_eq!(label, "LEFT VIEW");
        assert_eq!(camera.position, target + Vec3::new(2500.0, 1.0, 1.0));
        assert_eq!(camera.target, target);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let engine = PresetEngine::default();
        let target = Vec3::new(500.0, 500.0, 500.0);
        for preset in ViewPreset::ALL {
            let mut camera = Camera::default();
            engine.apply(preset, &mut camera, target);
            let first = camera.clone();
            engine.apply(preset, &mut camera, target);
            assert_eq!(camera, first);
        }
    }

    #[test]
    fn test_perspective_presets_share_label() {
        assert_eq!(ViewPreset::Perspective.label(), "PERSPECTIVE VIEW");
        assert_eq!(ViewPreset::PerspectiveOpposite.label(), "PERSPECTIVE VIEW");
        assert_eq!(
            ViewPreset::PerspectiveOpposite.offset(2500.0),
            Vec3::new(-625.0, 2500.0, -625.0)
        );
    }

    #[test]
    fn test_look_at_toggle() {
        let mut engine = PresetEngine::default();
        assert_eq!(engine.look_at, LookAtTarget::TargetNode);
        engine.toggle_look_at();
        assert_eq!(engine.focus_point(Vec3::ONE), Vec3::ZERO);
    }
}
