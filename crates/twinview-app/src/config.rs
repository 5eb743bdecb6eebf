//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use twinview_core::preset::DEFAULT_PRESET_DISTANCE;
use twinview_core::{KeyBindings, LookAtTarget, TargetPose, ViewSplit};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub osc: OscConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub target: TargetConfig,
    /// Trigger name to key overrides, e.g. `rotate = "q"`
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscConfig {
    /// Bind address for the pose stream
    #[serde(default = "default_osc_bind")]
    pub bind: String,
    /// Only accept poses sent to this OSC address (all addresses when unset)
    #[serde(default)]
    pub address: Option<String>,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            bind: default_osc_bind(),
            address: None,
        }
    }
}

fn default_osc_bind() -> String {
    format!("0.0.0.0:{}", twinview_osc::DEFAULT_POSE_PORT)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Where to forward poses and targets; stays in-process when unset
    #[serde(default)]
    pub target: Option<String>,
    /// Movement enabled at startup
    #[serde(default)]
    pub enabled_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Eye distance for view presets (scene units)
    #[serde(default = "default_preset_distance")]
    pub preset_distance: f32,
    #[serde(default)]
    pub look_at: LookAtTarget,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Share of the window width used by both viewports together
    #[serde(default)]
    pub split: ViewSplit,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Vertical field of view in degrees, both cameras
    #[serde(default = "default_fov")]
    pub fov_deg: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            preset_distance: default_preset_distance(),
            look_at: LookAtTarget::default(),
            frame_rate: default_frame_rate(),
            split: ViewSplit::default(),
            width: default_width(),
            height: default_height(),
            fov_deg: default_fov(),
        }
    }
}

fn default_preset_distance() -> f32 {
    DEFAULT_PRESET_DISTANCE
}

fn default_frame_rate() -> u32 {
    60
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_fov() -> f32 {
    60.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Initial target position (scene units)
    #[serde(default = "default_target_position")]
    pub position: [f32; 3],
    /// Initial target orientation as roll, pitch, yaw in degrees
    #[serde(default)]
    pub orientation_euler_deg: [f32; 3],
    /// On-screen size multiplier for the handle
    #[serde(default = "default_handle_scale")]
    pub handle_scale: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            position: default_target_position(),
            orientation_euler_deg: [0.0; 3],
            handle_scale: default_handle_scale(),
        }
    }
}

fn default_target_position() -> [f32; 3] {
    [500.0, 500.0, 500.0]
}

fn default_handle_scale() -> f32 {
    2.0
}

impl TargetConfig {
    pub fn to_target_pose(&self) -> TargetPose {
        let [roll, pitch, yaw] = self.orientation_euler_deg.map(f32::to_radians);
        TargetPose::new(
            self.position.into(),
            bevy::math::Quat::from_euler(bevy::math::EulerRot::XYZ, roll, pitch, yaw),
        )
    }
}

impl Config {
    /// Default bindings with the `[keys]` overrides applied
    pub fn key_bindings(&self) -> Result<KeyBindings> {
        let mut bindings = KeyBindings::default();
        bindings
            .apply_overrides(&self.keys)
            .context("Invalid [keys] table")?;
        Ok(bindings)
    }

    /// Seconds between frames at the configured rate
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / self.view.frame_rate.max(1) as f64
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        motion: MotionConfig {
            target: Some("127.0.0.1:12346".to_string()),
            enabled_on_start: false,
        },
        keys: [("copy_pose".to_string(), "c".to_string())]
            .into_iter()
            .collect(),
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinview_core::{HandleMode, Trigger};

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.osc.bind, "0.0.0.0:12345");
        assert_eq!(config.view.frame_rate, 60);
        assert_eq!(config.view.split, ViewSplit::default());
        assert_eq!(config.target.position, [500.0, 500.0, 500.0]);
        assert!(config.motion.target.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twinview.toml");
        std::fs::write(
            &path,
            r#"
[osc]
bind = "127.0.0.1:9000"
address = "/robot/joints"

[view]
look_at = "origin"
preset_distance = 1200.0

[keys]
rotate = "q"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.osc.bind, "127.0.0.1:9000");
        assert_eq!(config.osc.address.as_deref(), Some("/robot/joints"));
        assert_eq!(config.view.look_at, LookAtTarget::Origin);
        assert_eq!(config.view.preset_distance, 1200.0);
        assert_eq!(config.view.height, 1080);

        let bindings = config.key_bindings().unwrap();
        assert_eq!(bindings.trigger_for('q'), Some(Trigger::HandleMode(HandleMode::Rotate)));
    }

    #[test]
    fn test_bad_key_override_is_an_error() {
        let mut config = Config::default();
        config.keys.insert("rotate".to_string(), "shift+r".to_string());
        assert!(config.key_bindings().is_err());
        config.keys.clear();
        config.keys.insert("no_such_trigger".to_string(), "x".to_string());
        assert!(config.key_bindings().is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twinview.toml");
        save_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.motion.target.as_deref(), Some("127.0.0.1:12346"));
        assert_eq!(config.keys.get("copy_pose").map(String::as_str), Some("c"));
    }

    #[test]
    fn test_target_orientation_from_degrees() {
        let target = TargetConfig {
            position: [1.0, 2.0, 3.0],
            orientation_euler_deg: [0.0, 0.0, 90.0],
            handle_scale: 2.0,
        };
        let pose = target.to_target_pose();
        assert_eq!(pose.position, bevy::math::Vec3::new(1.0, 2.0, 3.0));
        let x = pose.orientation * bevy::math::Vec3::X;
        assert!(x.abs_diff_eq(bevy::math::Vec3::Y, 1e-5));
    }
}
