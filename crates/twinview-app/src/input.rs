//! Keyboard triggers, camera navigation and window resizes

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_egui::EguiContexts;
use tracing::debug;

use crate::app::{Bindings, FrameSet, OperatorLoop};

/// Pixel-unit wheel deltas are scaled down to roughly match line units
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, fit_layout_to_window)
            .add_systems(
                Update,
                (dispatch_key_triggers, track_window_size).in_set(FrameSet::Input),
            )
            .add_systems(Update, navigate_cameras.in_set(FrameSet::Orbit));
    }
}

/// Map typed characters to triggers. Repeats and keys typed into egui
/// widgets are ignored.
fn dispatch_key_triggers(
    mut keys: MessageReader<KeyboardInput>,
    bindings: Res<Bindings>,
    mut operator: ResMut<OperatorLoop>,
    mut contexts: EguiContexts,
) {
    let egui_wants_keyboard = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false);

    for input in keys.read() {
        if egui_wants_keyboard || input.state != ButtonState::Pressed || input.repeat {
            continue;
        }
        let Key::Character(text) = &input.logical_key else {
            continue;
        };
        let mut chars = text.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            continue;
        };
        match bindings.trigger_for(c) {
            Some(trigger) => {
                operator.dispatch(trigger);
            }
            None => debug!(key = %c, "Unbound key"),
        }
    }
}

fn fit_layout_to_window(
    mut operator: ResMut<OperatorLoop>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = windows.single() {
        operator.resize(window.width() as u32, window.height() as u32);
    }
}

/// Recompute both viewports on resize. Cameras go back to their defaults.
fn track_window_size(
    mut resized: MessageReader<WindowResized>,
    mut operator: ResMut<OperatorLoop>,
) {
    if let Some(last) = resized.read().last() {
        debug!(width = last.width, height = last.height, "Window resized");
        operator.resize(last.width as u32, last.height as u32);
    }
}

/// Left drag orbits and right drag pans the camera that had the pointer
/// when the button went down, even if the pointer later leaves its viewport.
/// Nothing moves while the target handle is held. The wheel dollies the
/// camera under the pointer.
fn navigate_cameras(
    mut operator: ResMut<OperatorLoop>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
) {
    let mut motion = Vec2::ZERO;
    for m in mouse_motion.read() {
        motion += m.delta;
    }
    let mut scroll = 0.0;
    for wheel in mouse_wheel.read() {
        scroll += match wheel.unit {
            MouseScrollUnit::Line => wheel.y,
            MouseScrollUnit::Pixel => wheel.y / PIXELS_PER_SCROLL_LINE,
        };
    }

    let console = operator.console_mut();
    let orbiting = mouse_button.pressed(MouseButton::Left);
    let panning = mouse_button.pressed(MouseButton::Right);

    if mouse_button.any_just_pressed([MouseButton::Left, MouseButton::Right]) {
        if let Some(id) = console.begin_camera_drag() {
            debug!(viewport = ?id, "Camera drag started");
        }
    }
    if !orbiting && !panning {
        console.end_camera_drag();
    } else if motion != Vec2::ZERO {
        let orbit = if orbiting { motion } else { Vec2::ZERO };
        let pan = if panning { motion } else { Vec2::ZERO };
        console.drag_camera(orbit, pan);
    }

    if scroll != 0.0 {
        if let Some(camera) = console.arbitrator.input_camera_mut() {
            camera.dolly(scroll);
        }
    }
}
