//! Operator console state and the trigger dispatch table

use std::collections::HashMap;

use glam::Vec2;
use tracing::debug;

use crate::arbitrator::{Arbitration, Arbitrator};
use crate::handle::TargetHandle;
use crate::preset::{PresetEngine, ViewPreset};
use crate::trigger::Trigger;
use crate::viewport::ViewportId;

/// Everything the operator steers: viewports and cameras, the target handle,
/// preset settings, the active-viewport selector and pending motion requests.
#[derive(Debug, Clone)]
pub struct Console {
    pub arbitrator: Arbitrator,
    pub handle: TargetHandle,
    pub presets: PresetEngine,
    active: Option<ViewportId>,
    movement_enabled: bool,
    movement_changed: bool,
    copy_requested: bool,
    /// Camera that owns the current pointer drag, fixed at press time
    dragged_camera: Option<ViewportId>,
}

impl Console {
    /// The active viewport starts on the live view, and a copy of the live
    /// pose into the target is requested right away.
    pub fn new(arbitrator: Arbitrator, handle: TargetHandle, presets: PresetEngine) -> Self {
        Self {
            arbitrator,
            handle,
            presets,
            active: Some(ViewportId::Real),
            movement_enabled: false,
            movement_changed: true,
            copy_requested: true,
            dragged_camera: None,
        }
    }

    /// Viewport that last had the pointer; targets presets and the highlight
    pub fn active(&self) -> Option<ViewportId> {
        self.active
    }

    pub fn set_active(&mut self, active: Option<ViewportId>) {
        self.active = active;
    }

    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    pub fn set_movement_enabled(&mut self, enabled: bool) {
        if self.movement_enabled != enabled {
            self.movement_enabled = enabled;
            self.movement_changed = true;
        }
    }

    pub fn toggle_movement(&mut self) {
        self.set_movement_enabled(!self.movement_enabled);
    }

    /// Movement flag to forward to the motion system, once per change
    pub fn take_movement_change(&mut self) -> Option<bool> {
        if self.movement_changed {
            self.movement_changed = false;
            Some(self.movement_enabled)
        } else {
            None
        }
    }

    pub fn request_copy(&mut self) {
        self.copy_requested = true;
    }

    pub fn copy_requested(&self) -> bool {
        self.copy_requested
    }

    pub(crate) fn clear_copy_request(&mut self) {
        self.copy_requested = false;
    }

    /// Apply a preset to the active viewport's camera. No active viewport
    /// means nothing happens.
    pub fn apply_preset(&mut self, preset: ViewPreset) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let target = self.handle.target().position;
        let label = self.presets.apply(preset, self.arbitrator.camera_mut(id), target);
        self.arbitrator.set_label(id, label);
        true
    }

    /// Per-frame camera arbitration; moves the active selector to whatever
    /// viewport the pointer is over.
    pub fn arbitrate(&mut self, pointer: Option<Vec2>) -> Arbitration {
        let outcome = self
            .arbitrator
            .arbitrate(pointer, self.handle.is_interacting());
        if let Some(hovered) = outcome.hovered {
            self.active = Some(hovered);
        }
        outcome
    }

    fn clear_active_label(&mut self) {
        if let Some(id) = self.active {
            self.arbitrator.clear_label(id);
        }
    }

    /// Grab the handle. A copy request still waiting for a live pose is
    /// dropped so it cannot overwrite the edit later.
    pub fn begin_handle_drag(&mut self) -> bool {
        if !self.handle.begin_drag() {
            return false;
        }
        if self.copy_requested {
            debug!("Pending pose copy cancelled by handle drag");
            self.copy_requested = false;
        }
        self.clear_active_label();
        true
    }

    pub fn end_handle_drag(&mut self) {
        self.handle.end_drag();
    }

    /// Latch the camera with pointer input for a drag starting now. Nothing
    /// is latched while the handle is held; an existing latch is kept.
    pub fn begin_camera_drag(&mut self) -> Option<ViewportId> {
        if self.dragged_camera.is_none() && !self.handle.is_interacting() {
            self.dragged_camera = self.arbitrator.focus().viewport();
        }
        self.dragged_camera
    }

    pub fn dragged_camera(&self) -> Option<ViewportId> {
        self.dragged_camera
    }

    /// Orbit and pan the latched camera, wherever the pointer is now, and
    /// clear its label. Returns false when no camera drag is in progress.
    pub fn drag_camera(&mut self, orbit: Vec2, pan: Vec2) -> bool {
        let Some(id) = self.dragged_camera else {
            return false;
        };
        if self.handle.is_interacting() || (orbit == Vec2::ZERO && pan == Vec2::ZERO) {
            return false;
        }
        let camera = self.arbitrator.camera_mut(id);
        if orbit != Vec2::ZERO {
            camera.orbit(orbit);
        }
        if pan != Vec2::ZERO {
            camera.pan(pan);
        }
        self.arbitrator.clear_label(id);
        true
    }

    pub fn end_camera_drag(&mut self) {
        self.dragged_camera = None;
    }

    /// New window size: viewports and cameras are rebuilt and the live view
    /// becomes active again.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.arbitrator.resize(width, height);
        self.dragged_camera = None;
        self.active = Some(ViewportId::Real);
    }
}

/// Handler invoked for a trigger; receives the trigger so parameterized
/// triggers (mode, preset) can share one handler.
pub type Handler = fn(&mut Console, Trigger);

/// Trigger identity to handler
pub struct TriggerTable {
    handlers: HashMap<Trigger, Handler>,
}

impl Default for TriggerTable {
    fn default() -> Self {
        let mut table = Self {
            handlers: HashMap::new(),
        };
        for trigger in Trigger::all() {
            let handler: Handler = match trigger {
                Trigger::ToggleMovement => |console, _| console.toggle_movement(),
                Trigger::HandleMode(_) => |console, trigger| {
                    if let Trigger::HandleMode(mode) = trigger {
                        console.handle.set_mode(mode);
                    }
                },
                Trigger::ToggleHandleVisible => |console, _| console.handle.toggle_visible(),
                Trigger::ViewPreset(_) => |console, trigger| {
                    if let Trigger::ViewPreset(preset) = trigger {
                        console.apply_preset(preset);
                    }
                },
                Trigger::CopyPoseToTarget => |console, _| console.request_copy(),
                Trigger::ToggleLookAtTarget => |console, _| console.presets.toggle_look_at(),
            };
            table.register(trigger, handler);
        }
        table
    }
}

impl TriggerTable {
    pub fn register(&mut self, trigger: Trigger, handler: Handler) {
        self.handlers.insert(trigger, handler);
    }

    /// Run the handler for `trigger`; returns false when none is registered
    pub fn dispatch(&self, console: &mut Console, trigger: Trigger) -> bool {
        match self.handlers.get(&trigger) {
            Some(handler) => {
                handler(console, trigger);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TriggerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerTable")
            .field("triggers", &self.handlers.len())
            .finish()
    }
}
