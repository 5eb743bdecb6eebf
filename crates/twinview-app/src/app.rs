//! Bevy application setup

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy::winit::{UpdateMode, WinitSettings};
use bevy_egui::{EguiContexts, EguiPlugin};
use std::time::Duration;
use tracing::info;
use twinview_core::{
    Arbitrator, Console, FrameLoop, KeyBindings, MotionSystem, PresetEngine, RateMeter,
    TargetHandle, TickReport,
};
use twinview_osc::PoseReceiver;

use crate::config::Config;
use crate::handle::HandlePlugin;
use crate::input::InputPlugin;
use crate::scene::ScenePlugin;
use crate::ui::UiPlugin;

/// The per-tick orchestrator: pose stream in, motion system out
#[derive(Resource, Deref, DerefMut)]
pub struct OperatorLoop(pub FrameLoop<PoseReceiver, Box<dyn MotionSystem>>);

/// Key character to trigger map, after config overrides
#[derive(Resource, Deref)]
pub struct Bindings(pub KeyBindings);

/// Camera settings shared by both viewports
#[derive(Debug, Clone, Resource)]
pub struct ViewSettings {
    /// Vertical field of view, radians
    pub fov_y: f32,
}

/// Front-end frame rate and the outcome of the last tick
#[derive(Debug, Clone, Resource, Default)]
pub struct FrameStats {
    pub frames: RateMeter,
    pub last: Option<TickReport>,
}

/// Per-frame ordering inside `Update`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Keyboard triggers and window resizes
    Input,
    /// Grab, drag and release of the target handle
    Handle,
    /// Drain, forward, arbitrate
    Tick,
    /// Orbit/pan/dolly of whichever camera owns the pointer
    Orbit,
    /// Push core state onto cameras and scene entities
    Sync,
}

/// Run the Bevy application
pub fn run(
    config: Config,
    bindings: KeyBindings,
    receiver: PoseReceiver,
    motion: Box<dyn MotionSystem>,
) {
    let handle = TargetHandle::new(config.target.to_target_pose(), config.target.handle_scale);
    let presets = PresetEngine::new(config.view.preset_distance, config.view.look_at);
    let arbitrator = Arbitrator::new(config.view.width, config.view.height, config.view.split);
    let mut console = Console::new(arbitrator, handle, presets);
    console.set_movement_enabled(config.motion.enabled_on_start);

    let frame_interval = Duration::from_secs_f64(config.frame_interval_secs());
    info!(
        frame_rate = config.view.frame_rate,
        width = config.view.width,
        height = config.view.height,
        "Opening operator window"
    );

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)))
        .insert_resource(WinitSettings {
            focused_mode: UpdateMode::reactive(frame_interval),
            unfocused_mode: UpdateMode::reactive_low_power(frame_interval),
        })
        // The tracing subscriber is installed in main
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Twinview".to_string(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<bevy::log::LogPlugin>(),
        )
        .add_plugins(EguiPlugin::default())
        .insert_resource(OperatorLoop(FrameLoop::new(receiver, motion, console)))
        .insert_resource(Bindings(bindings))
        .insert_resource(ViewSettings {
            fov_y: config.view.fov_deg.to_radians(),
        })
        .init_resource::<FrameStats>()
        .insert_resource(InitialWindowSize(config.view.width, config.view.height))
        .configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Handle,
                FrameSet::Tick,
                FrameSet::Orbit,
                FrameSet::Sync,
            )
                .chain(),
        )
        .add_systems(Startup, apply_initial_window_size)
        .add_systems(Update, tick_frame_loop.in_set(FrameSet::Tick))
        .add_plugins(ScenePlugin)
        .add_plugins(InputPlugin)
        .add_plugins(HandlePlugin)
        .add_plugins(UiPlugin)
        .run();
}

#[derive(Resource)]
struct InitialWindowSize(u32, u32);

fn apply_initial_window_size(
    size: Res<InitialWindowSize>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if let Ok(mut window) = windows.single_mut() {
        window.resolution.set(size.0 as f32, size.1 as f32);
    }
}

/// One orchestrator tick per frame. The pointer counts as outside the
/// window while egui is using it.
fn tick_frame_loop(
    mut operator: ResMut<OperatorLoop>,
    mut stats: ResMut<FrameStats>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let pointer = if egui_wants_pointer {
        None
    } else {
        windows.single().ok().and_then(|w| w.cursor_position())
    };

    let report = operator.tick(pointer);
    stats.frames.record();
    stats.last = Some(report);
}
