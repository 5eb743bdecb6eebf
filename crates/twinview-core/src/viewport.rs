//! Viewport geometry for the two side-by-side views

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// Which of the two views a viewport, camera or label belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportId {
    /// Simulated robot plus the target handle (left)
    Sim,
    /// Live robot as reported over the pose stream (right)
    Real,
}

impl ViewportId {
    pub const ALL: [ViewportId; 2] = [ViewportId::Sim, ViewportId::Real];

    /// Fixed caption drawn under the view
    pub fn caption(&self) -> &'static str {
        match self {
            ViewportId::Sim => "SIMULATED",
            ViewportId::Real => "REALTIME",
        }
    }
}

impl std::fmt::Display for ViewportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewportId::Sim => write!(f, "sim"),
            ViewportId::Real => write!(f, "real"),
        }
    }
}

/// Screen rectangle in logical pixels, origin at the window's top-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Strict containment: points on the edge belong to neither side,
    /// so two rectangles sharing an edge never both claim the pointer.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.x
            && point.y > self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    pub fn overlaps(&self, other: &ViewRect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Share of the window width given to the two viewports together.
///
/// The remainder on the right is left for panels. Each viewport gets half
/// of the share, computed in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSplit {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for ViewSplit {
    fn default() -> Self {
        Self {
            numerator: 21,
            denominator: 24,
        }
    }
}

impl ViewSplit {
    /// Width of a single viewport for the given window width
    pub fn viewport_width(&self, window_width: u32) -> u32 {
        if self.denominator == 0 {
            return window_width / 2;
        }
        let shared = (window_width as u64 * self.numerator as u64) / self.denominator as u64;
        (shared / 2) as u32
    }
}

/// Rectangles for both viewports at one window size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportLayout {
    pub sim: ViewRect,
    pub real: ViewRect,
}

impl ViewportLayout {
    /// Sim takes the left slot, real the slot right next to it, both full height.
    pub fn from_window(width: u32, height: u32, split: ViewSplit) -> Self {
        let w = split.viewport_width(width) as f32;
        let h = height as f32;
        Self {
            sim: ViewRect::new(0.0, 0.0, w, h),
            real: ViewRect::new(w, 0.0, w, h),
        }
    }

    pub fn rect(&self, id: ViewportId) -> ViewRect {
        match id {
            ViewportId::Sim => self.sim,
            ViewportId::Real => self.real,
        }
    }

    /// Viewport under the pointer, if any
    pub fn viewport_at(&self, point: Vec2) -> Option<ViewportId> {
        ViewportId::ALL
            .into_iter()
            .find(|id| self.rect(*id).contains(point))
    }
}

/// One view: its rectangle, its camera and its transient label
#[derive(Debug, Clone)]
pub struct Viewport {
    pub id: ViewportId,
    pub rect: ViewRect,
    pub camera: Camera,
    pub label: String,
}

impl Viewport {
    pub fn new(id: ViewportId, rect: ViewRect) -> Self {
        Self {
            id,
            rect,
            camera: Camera::default(),
            label: String::new(),
        }
    }
}
