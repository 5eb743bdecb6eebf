//! Target handle picking and dragging in the sim view

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use tracing::debug;
use twinview_core::handle::DragView;
use twinview_core::ViewportId;

use crate::app::{FrameSet, OperatorLoop, ViewSettings};

pub struct HandlePlugin;

impl Plugin for HandlePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, drive_handle.in_set(FrameSet::Handle));
    }
}

/// Grab on left press over the projected node, drag with the cursor, let go
/// on release. Drag deltas are cursor pixels so translation tracks the
/// pointer at the node's depth.
fn drive_handle(
    mut operator: ResMut<OperatorLoop>,
    mut last_cursor: Local<Option<Vec2>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    view: Res<ViewSettings>,
    mut contexts: EguiContexts,
) {
    let cursor = windows.single().ok().and_then(|w| w.cursor_position());
    let previous = std::mem::replace(&mut *last_cursor, cursor);

    if mouse_button.just_released(MouseButton::Left) && operator.console().handle.is_interacting() {
        operator.end_handle_drag();
        debug!("Handle released");
        return;
    }

    let console = operator.console();
    let sim_rect = console.arbitrator.layout().rect(ViewportId::Sim);
    let sim_camera = console.arbitrator.camera(ViewportId::Sim);

    if mouse_button.just_pressed(MouseButton::Left) {
        let egui_wants_pointer = contexts
            .ctx_mut()
            .map(|ctx| ctx.wants_pointer_input())
            .unwrap_or(false);
        let Some(pointer) = cursor else {
            return;
        };
        if egui_wants_pointer || !sim_rect.contains(pointer) {
            return;
        }
        if console.handle.hit_test(sim_camera, &sim_rect, view.fov_y, pointer)
            && operator.begin_handle_drag()
        {
            debug!(mode = %operator.console().handle.mode(), "Handle grabbed");
        }
        return;
    }

    if !console.handle.is_interacting() || !mouse_button.pressed(MouseButton::Left) {
        return;
    }
    let (Some(now), Some(before)) = (cursor, previous) else {
        return;
    };
    let delta = now - before;
    if delta == Vec2::ZERO {
        return;
    }
    let drag_view = DragView::new(
        sim_camera,
        console.handle.target().position,
        view.fov_y,
        sim_rect.height,
    );
    operator.drag_handle(delta, &drag_view);
}
