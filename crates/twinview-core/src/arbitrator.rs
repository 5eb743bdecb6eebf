//! Viewport/camera arbitration
//!
//! Decides once per frame which camera listens to the pointer. The decision
//! is kept as a single [`InputFocus`] state and the two cameras' input flags
//! are only ever written from it, so both cameras can never be live at once.

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::camera::{Camera, CAMERA_UP, DEFAULT_EYE};
use crate::viewport::{ViewSplit, Viewport, ViewportId, ViewportLayout};

/// Which camera currently receives pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    None,
    Real,
    Sim,
}

impl InputFocus {
    pub fn viewport(&self) -> Option<ViewportId> {
        match self {
            InputFocus::None => None,
            InputFocus::Real => Some(ViewportId::Real),
            InputFocus::Sim => Some(ViewportId::Sim),
        }
    }
}

/// Outcome of one arbitration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitration {
    pub focus: InputFocus,
    /// Viewport the pointer is over, whether or not its camera got input
    pub hovered: Option<ViewportId>,
}

/// Owns both viewports (rectangle, camera, label) and the input focus
#[derive(Debug, Clone)]
pub struct Arbitrator {
    split: ViewSplit,
    sim: Viewport,
    real: Viewport,
    focus: InputFocus,
}

impl Arbitrator {
    pub fn new(width: u32, height: u32, split: ViewSplit) -> Self {
        let layout = ViewportLayout::from_window(width, height, split);
        let mut arbitrator = Self {
            split,
            sim: Viewport::new(ViewportId::Sim, layout.sim),
            real: Viewport::new(ViewportId::Real, layout.real),
            focus: InputFocus::None,
        };
        arbitrator.reset_cameras();
        arbitrator
    }

    pub fn focus(&self) -> InputFocus {
        self.focus
    }

    pub fn layout(&self) -> ViewportLayout {
        ViewportLayout {
            sim: self.sim.rect,
            real: self.real.rect,
        }
    }

    pub fn viewport(&self, id: ViewportId) -> &Viewport {
        match id {
            ViewportId::Sim => &self.sim,
            ViewportId::Real => &self.real,
        }
    }

    fn viewport_mut(&mut self, id: ViewportId) -> &mut Viewport {
        match id {
            ViewportId::Sim => &mut self.sim,
            ViewportId::Real => &mut self.real,
        }
    }

    pub fn camera(&self, id: ViewportId) -> &Camera {
        &self.viewport(id).camera
    }

    /// Mutable camera access for orbit/preset moves. The input flag stays
    /// private to the arbitrator.
    pub fn camera_mut(&mut self, id: ViewportId) -> &mut Camera {
        &mut self.viewport_mut(id).camera
    }

    /// Camera that currently has pointer input, if any
    pub fn input_camera_mut(&mut self) -> Option<&mut Camera> {
        let id = self.focus.viewport()?;
        Some(self.camera_mut(id))
    }

    pub fn label(&self, id: ViewportId) -> &str {
        &self.viewport(id).label
    }

    pub fn set_label(&mut self, id: ViewportId, label: impl Into<String>) {
        self.viewport_mut(id).label = label.into();
    }

    pub fn clear_label(&mut self, id: ViewportId) {
        self.viewport_mut(id).label.clear();
    }

    /// Run the per-frame rules for a pointer position.
    ///
    /// Real and sim are evaluated independently: the pointer over real gives
    /// real the input; over sim gives sim the input unless the target handle
    /// is mid-drag, in which case no camera gets it. Outside both, nobody
    /// does. `hovered` reports the viewport under the pointer so the caller
    /// can move its active-viewport selector.
    pub fn arbitrate(&mut self, pointer: Option<Vec2>, handle_interacting: bool) -> Arbitration {
        let mut focus = InputFocus::None;
        let mut hovered = None;

        if let Some(point) = pointer {
            if self.real.rect.contains(point) {
                focus = InputFocus::Real;
                hovered = Some(ViewportId::Real);
            }
            if self.sim.rect.contains(point) {
                hovered = Some(ViewportId::Sim);
                focus = if handle_interacting {
                    InputFocus::None
                } else {
                    InputFocus::Sim
                };
            }
        }

        self.set_focus(focus);
        Arbitration { focus, hovered }
    }

    fn set_focus(&mut self, focus: InputFocus) {
        if focus != self.focus {
            debug!(from = ?self.focus, to = ?focus, "Camera input focus changed");
        }
        self.focus = focus;
        self.real.camera.set_input_enabled(focus == InputFocus::Real);
        self.sim.camera.set_input_enabled(focus == InputFocus::Sim);
    }

    /// Recompute both rectangles for a new window size and put both cameras
    /// back on the default framing.
    pub fn resize(&mut self, width: u32, height: u32) {
        let layout = ViewportLayout::from_window(width, height, self.split);
        self.sim.rect = layout.sim;
        self.real.rect = layout.real;
        self.reset_cameras();
        debug!(width, height, "Viewports recomputed");
    }

    fn reset_cameras(&mut self) {
        for id in ViewportId::ALL {
            let camera = self.camera_mut(id);
            camera.reset();
            camera.set_position(DEFAULT_EYE);
            camera.look_at(Vec3::ZERO, CAMERA_UP);
        }
    }
}
