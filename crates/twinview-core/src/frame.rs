//! Per-tick orchestration
//!
//! One tick: drain the pose source, forward the live pose and the target to
//! the motion system, then arbitrate camera input. Rendering happens after
//! the tick, from the state exposed here.

use glam::Vec2;
use tracing::{debug, trace};

use crate::arbitrator::InputFocus;
use crate::console::{Console, TriggerTable};
use crate::handle::DragView;
use crate::motion::MotionSystem;
use crate::pose::{Pose, PoseSource};
use crate::trigger::Trigger;
use crate::viewport::ViewportId;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// A new pose arrived this tick
    pub new_pose: bool,
    pub focus: InputFocus,
    pub active: Option<ViewportId>,
}

pub struct FrameLoop<S, M> {
    source: S,
    motion: M,
    console: Console,
    triggers: TriggerTable,
    current_pose: Pose,
    ticks: u64,
}

impl<S: PoseSource, M: MotionSystem> FrameLoop<S, M> {
    pub fn new(source: S, motion: M, console: Console) -> Self {
        Self {
            source,
            motion,
            console,
            triggers: TriggerTable::default(),
            current_pose: Pose::default(),
            ticks: 0,
        }
    }

    /// Run one tick with the pointer at `pointer` (window coordinates, or
    /// `None` when the pointer is outside the window).
    pub fn tick(&mut self, pointer: Option<Vec2>) -> TickReport {
        self.ticks += 1;

        let new_pose = match self.source.drain_latest() {
            Some(pose) => {
                trace!(joints = pose.len(), "New pose");
                self.current_pose = pose;
                true
            }
            None => false,
        };

        self.motion.update_pose(&self.current_pose, new_pose);
        self.flush_requests();
        self.motion.update_target(&self.console.handle.target());

        let outcome = self.console.arbitrate(pointer);

        TickReport {
            new_pose,
            focus: outcome.focus,
            active: self.console.active(),
        }
    }

    /// Forward pending movement toggles and copy requests. A copy stays
    /// pending until the motion system has a live pose to hand back.
    fn flush_requests(&mut self) {
        if let Some(enabled) = self.console.take_movement_change() {
            debug!(enabled, "Movement toggled");
            self.motion.set_movement_enabled(enabled);
        }
        if self.console.copy_requested() {
            if let Some(target) = self.motion.copy_current_pose_to_target() {
                debug!(position = ?target.position, "Copied live pose into target");
                self.console.handle.set_target(target);
                self.console.clear_copy_request();
            }
        }
    }

    pub fn dispatch(&mut self, trigger: Trigger) -> bool {
        let handled = self.triggers.dispatch(&mut self.console, trigger);
        if handled {
            debug!(trigger = %trigger.name(), "Trigger");
            self.flush_requests();
        }
        handled
    }

    pub fn begin_handle_drag(&mut self) -> bool {
        self.console.begin_handle_drag()
    }

    pub fn drag_handle(&mut self, delta: Vec2, view: &DragView) {
        self.console.handle.drag(delta, view);
    }

    pub fn end_handle_drag(&mut self) {
        self.console.end_handle_drag();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.console.resize(width, height);
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Last known live pose; persists across ticks with no new data
    pub fn current_pose(&self) -> &Pose {
        &self.current_pose
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrator::Arbitrator;
    use crate::handle::TargetHandle;
    use crate::motion::LoopbackMotion;
    use crate::pose::{QueuedPoses, TargetPose};
    use crate::preset::{LookAtTarget, PresetEngine, ViewPreset};
    use crate::viewport::ViewSplit;
    use glam::Vec3;
    use std::thread;
    use std::time::{Duration, Instant};

    fn frame_loop() -> FrameLoop<QueuedPoses, LoopbackMotion> {
        let console = Console::new(
            Arbitrator::new(914, 600, ViewSplit::default()),
            TargetHandle::default(),
            PresetEngine::new(2500.0, LookAtTarget::Origin),
        );
        FrameLoop::new(QueuedPoses::new(), LoopbackMotion::new(), console)
    }

    #[test]
    fn test_tick_forwards_last_pose_of_tick() {
        let mut fl = frame_loop();
        fl.source_mut().push(vec![1.0, 1.0, 1.0]);
        fl.source_mut().push(vec![10.0, 20.0, 30.0, 0.0, 0.0, 0.0]);

        let report = fl.tick(None);
        assert!(report.new_pose);
        let expected = Pose::new(vec![10.0, 20.0, 30.0, 0.0, 0.0, 0.0]);
        assert_eq!(fl.current_pose(), &expected);
        assert_eq!(fl.motion().last_pose, expected);
    }

    #[test]
    fn test_pose_persists_without_new_data() {
        let mut fl = frame_loop();
        fl.source_mut().push(vec![1.0, 2.0, 3.0]);
        fl.tick(None);
        let report = fl.tick(None);
        assert!(!report.new_pose);
        assert_eq!(fl.current_pose(), &Pose::new(vec![1.0, 2.0, 3.0]));
        assert_eq!(fl.motion().pose_updates, 2);
        assert_eq!(fl.motion().target_updates, 2);
    }

    #[test]
    fn test_startup_copy_waits_for_live_pose() {
        let mut fl = frame_loop();
        fl.tick(None);
        assert!(fl.console().copy_requested());
        assert_eq!(fl.console().handle.target(), TargetPose::default());

        fl.source_mut().push(vec![100.0, 200.0, 300.0, 0.0, 0.0, 0.0]);
        fl.tick(None);
        assert!(!fl.console().copy_requested());
        assert_eq!(fl.console().handle.target().position, Vec3::new(100.0, 200.0, 300.0));
        assert_eq!(
            fl.motion().last_target.unwrap().position,
            Vec3::new(100.0, 200.0, 300.0)
        );
    }

    #[test]
    fn test_pointer_in_sim_makes_sim_active() {
        let mut fl = frame_loop();
        let report = fl.tick(Some(Vec2::new(50.0, 50.0)));
        assert_eq!(report.focus, InputFocus::Sim);
        assert_eq!(report.active, Some(ViewportId::Sim));
        assert!(fl.console().arbitrator.camera(ViewportId::Sim).input_enabled());
        assert!(!fl.console().arbitrator.camera(ViewportId::Real).input_enabled());
    }

    #[test]
    fn test_dispatch_preset_on_sim() {
        let mut fl = frame_loop();
        fl.tick(Some(Vec2::new(50.0, 50.0)));
        assert!(fl.dispatch(Trigger::ViewPreset(ViewPreset::Top)));
        let camera = fl.console().arbitrator.camera(ViewportId::Sim);
        assert_eq!(camera.position, Vec3::new(-1.0, 1.0, 2500.0));
        assert_eq!(fl.console().arbitrator.label(ViewportId::Sim), "TOP VIEW");
    }

    #[test]
    fn test_movement_toggle_reaches_motion_system() {
        let mut fl = frame_loop();
        fl.dispatch(Trigger::ToggleMovement);
        assert!(fl.motion().movement_enabled);
        fl.dispatch(Trigger::ToggleMovement);
        assert!(!fl.motion().movement_enabled);
    }

    #[test]
    fn test_handle_drag_feeds_next_tick() {
        let mut fl = frame_loop();
        fl.console_mut().clear_copy_request();
        fl.tick(Some(Vec2::new(50.0, 50.0)));
        assert!(fl.begin_handle_drag());
        let view = DragView {
            right: Vec3::X,
            up: Vec3::Y,
            units_per_pixel: 1.0,
        };
        fl.drag_handle(Vec2::new(25.0, 0.0), &view);
        let report = fl.tick(Some(Vec2::new(60.0, 50.0)));
        assert_eq!(report.focus, InputFocus::None);
        assert_eq!(
            fl.motion().last_target.unwrap().position,
            Vec3::new(525.0, 500.0, 500.0)
        );
        fl.end_handle_drag();
        assert_eq!(fl.tick(Some(Vec2::new(60.0, 50.0))).focus, InputFocus::Sim);
    }

    #[test]
    fn test_resize_recomputes_layout() {
        let mut fl = frame_loop();
        fl.tick(Some(Vec2::new(50.0, 50.0)));
        fl.resize(1920, 1080);
        assert_eq!(fl.console().arbitrator.layout().sim.width, 840.0);
        assert_eq!(fl.console().active(), Some(ViewportId::Real));
    }

    #[test]
    fn test_pointer_moving_into_real_reports_real_active() {
        let mut fl = frame_loop();
        assert_eq!(fl.tick(Some(Vec2::new(50.0, 50.0))).active, Some(ViewportId::Sim));

        let report = fl.tick(Some(Vec2::new(600.0, 300.0)));
        assert_eq!(report.focus, InputFocus::Real);
        assert_eq!(report.active, Some(ViewportId::Real));
        assert_eq!(fl.console().active(), Some(ViewportId::Real));
    }

    #[test]
    fn test_handle_edit_survives_late_first_pose() {
        let mut fl = frame_loop();
        fl.tick(Some(Vec2::new(50.0, 50.0)));
        assert!(fl.console().copy_requested());

        assert!(fl.begin_handle_drag());
        let view = DragView {
            right: Vec3::X,
            up: Vec3::Y,
            units_per_pixel: 1.0,
        };
        fl.drag_handle(Vec2::new(100.0, 0.0), &view);
        fl.end_handle_drag();
        for _ in 0..600 {
            fl.tick(None);
        }

        fl.source_mut().push(vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        fl.tick(None);
        assert_eq!(fl.console().handle.target().position, Vec3::new(600.0, 500.0, 500.0));
        assert_eq!(
            fl.motion().last_target.unwrap().position,
            Vec3::new(600.0, 500.0, 500.0)
        );
    }

    #[test]
    fn test_robot_rate_counts_only_fresh_poses() {
        let mut fl = frame_loop();
        let idle_until = Instant::now() + Duration::from_millis(1100);
        while Instant::now() < idle_until {
            fl.tick(None);
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(fl.motion().update_rate(), 0.0);

        let busy_until = Instant::now() + Duration::from_millis(1100);
        while Instant::now() < busy_until {
            fl.source_mut().push(vec![1.0, 2.0, 3.0]);
            fl.tick(None);
            thread::sleep(Duration::from_millis(5));
        }
        assert!(fl.motion().update_rate() > 0.0);
    }
}
