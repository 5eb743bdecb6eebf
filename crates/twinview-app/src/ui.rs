//! UI overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use twinview_core::{HandleMode, LookAtTarget, MotionSystem, Trigger, ViewRect, ViewportId};

use crate::app::{Bindings, FrameStats, OperatorLoop};

const HIGHLIGHT_WIDTH: f32 = 6.0;
const HIGHLIGHT_ALPHA: u8 = 30;
const CAPTION_SIZE: f32 = 18.0;
const LABEL_SIZE: f32 = 22.0;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            EguiPrimaryContextPass,
            (draw_viewport_overlays, status_panel).chain(),
        );
    }
}

fn to_egui_rect(rect: &ViewRect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x, rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

/// Focus highlight around the active viewport, captions and preset labels
/// along the bottom edge of each viewport.
fn draw_viewport_overlays(mut contexts: EguiContexts, operator: Res<OperatorLoop>) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("viewport_overlays"),
    ));

    let console = operator.console();
    let layout = console.arbitrator.layout();

    if let Some(active) = console.active() {
        painter.rect_stroke(
            to_egui_rect(&layout.rect(active)),
            0.0,
            egui::Stroke::new(HIGHLIGHT_WIDTH, egui::Color32::from_white_alpha(HIGHLIGHT_ALPHA)),
            egui::StrokeKind::Inside,
        );
    }

    for id in ViewportId::ALL {
        let rect = to_egui_rect(&layout.rect(id));
        let bottom = rect.center_bottom() - egui::vec2(0.0, 12.0);
        painter.text(
            bottom,
            egui::Align2::CENTER_BOTTOM,
            id.caption(),
            egui::FontId::proportional(CAPTION_SIZE),
            egui::Color32::WHITE,
        );
        let label = console.arbitrator.label(id);
        if !label.is_empty() {
            painter.text(
                bottom - egui::vec2(0.0, CAPTION_SIZE + 8.0),
                egui::Align2::CENTER_BOTTOM,
                label,
                egui::FontId::proportional(LABEL_SIZE),
                egui::Color32::from_rgb(255, 220, 120),
            );
        }
    }
}

fn status_panel(
    mut contexts: EguiContexts,
    mut operator: ResMut<OperatorLoop>,
    stats: Res<FrameStats>,
    bindings: Res<Bindings>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let key_hint = |trigger: Trigger| {
        bindings
            .key_for(trigger)
            .map(|k| format!(" [{}]", k))
            .unwrap_or_default()
    };

    let mut fired: Option<Trigger> = None;

    egui::Window::new("Status")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            let console = operator.console();

            ui.label(format!("Frame rate: {:.1}", stats.frames.rate()));
            ui.label(format!("Robot rate: {:.1}", operator.motion().update_rate()));
            ui.separator();

            let movement = if console.movement_enabled() { "ON" } else { "OFF" };
            if ui
                .button(format!("Movement: {}{}", movement, key_hint(Trigger::ToggleMovement)))
                .clicked()
            {
                fired = Some(Trigger::ToggleMovement);
            }

            ui.horizontal(|ui| {
                for mode in [HandleMode::Translate, HandleMode::Rotate, HandleMode::Scale] {
                    let text = format!("{}{}", mode, key_hint(Trigger::HandleMode(mode)));
                    if ui.selectable_label(console.handle.mode() == mode, text).clicked() {
                        fired = Some(Trigger::HandleMode(mode));
                    }
                }
            });

            let handle_state = if console.handle.is_visible() { "shown" } else { "hidden" };
            if ui
                .button(format!("Handle: {}{}", handle_state, key_hint(Trigger::ToggleHandleVisible)))
                .clicked()
            {
                fired = Some(Trigger::ToggleHandleVisible);
            }

            let look_at = match console.presets.look_at {
                LookAtTarget::Origin => "origin",
                LookAtTarget::TargetNode => "target",
            };
            if ui
                .button(format!("Presets look at: {}{}", look_at, key_hint(Trigger::ToggleLookAtTarget)))
                .clicked()
            {
                fired = Some(Trigger::ToggleLookAtTarget);
            }

            let copy_text = if console.copy_requested() {
                "Copy pose (pending)".to_string()
            } else {
                format!("Copy pose{}", key_hint(Trigger::CopyPoseToTarget))
            };
            if ui.button(copy_text).clicked() {
                fired = Some(Trigger::CopyPoseToTarget);
            }

            ui.separator();
            let target = console.handle.target().position;
            ui.label(format!(
                "Target: {:.1}, {:.1}, {:.1}",
                target.x, target.y, target.z
            ));

            let pose = operator.current_pose();
            if pose.is_empty() {
                ui.label("Pose: waiting for data");
            } else {
                let joints: Vec<String> = pose.joints().iter().map(|j| format!("{:.2}", j)).collect();
                ui.label(format!("Pose ({}): {}", pose.len(), joints.join(", ")));
            }
            if let Some(report) = stats.last {
                ui.label(format!("Focus: {:?}", report.focus));
            }
        });

    if let Some(trigger) = fired {
        operator.dispatch(trigger);
    }
}
