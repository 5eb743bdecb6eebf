//! Motion system seam
//!
//! The motion system turns poses and targets into robot motion. It lives
//! outside this crate; the frame loop only hands it values once per tick and
//! never waits for it.

use glam::{EulerRot, Quat, Vec3};
use std::time::{Duration, Instant};

use crate::pose::{Pose, TargetPose};

pub trait MotionSystem: Send + Sync {
    /// Latest live pose, every tick whether or not it changed. `fresh` is
    /// true only on ticks where the pose stream delivered new data.
    fn update_pose(&mut self, pose: &Pose, fresh: bool);

    /// Current target node, every tick
    fn update_target(&mut self, target: &TargetPose);

    fn set_movement_enabled(&mut self, enabled: bool);

    /// Live robot pose expressed as a target, or `None` while the motion
    /// system has nothing to copy yet.
    fn copy_current_pose_to_target(&mut self) -> Option<TargetPose>;

    /// Tool transform for drawing the live robot
    fn live_transform(&self) -> Option<TargetPose>;

    /// Fresh poses per second as measured by the motion system
    fn update_rate(&self) -> f32;
}

impl<M: MotionSystem + ?Sized> MotionSystem for Box<M> {
    fn update_pose(&mut self, pose: &Pose, fresh: bool) {
        (**self).update_pose(pose, fresh)
    }

    fn update_target(&mut self, target: &TargetPose) {
        (**self).update_target(target)
    }

    fn set_movement_enabled(&mut self, enabled: bool) {
        (**self).set_movement_enabled(enabled)
    }

    fn copy_current_pose_to_target(&mut self) -> Option<TargetPose> {
        (**self).copy_current_pose_to_target()
    }

    fn live_transform(&self) -> Option<TargetPose> {
        (**self).live_transform()
    }

    fn update_rate(&self) -> f32 {
        (**self).update_rate()
    }
}

/// Reads the first six joint values as x, y, z and roll, pitch, yaw (radians).
///
/// Poses shorter than three values have no position and yield `None`;
/// missing angles count as zero.
pub fn tool_transform_from_pose(pose: &Pose) -> Option<TargetPose> {
    let j = pose.joints();
    if j.len() < 3 {
        return None;
    }
    let position = Vec3::new(j[0] as f32, j[1] as f32, j[2] as f32);
    let angle = |i: usize| j.get(i).copied().unwrap_or(0.0) as f32;
    let orientation = Quat::from_euler(EulerRot::XYZ, angle(3), angle(4), angle(5));
    Some(TargetPose::new(position, orientation))
}

/// Counts events and reports them as a per-second rate, refreshed once per
/// elapsed second.
#[derive(Debug, Clone, Default)]
pub struct RateMeter {
    window_start: Option<Instant>,
    count: u32,
    rate: f32,
}

impl RateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    pub fn record_at(&mut self, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.count += 1;
        let elapsed = now.duration_since(start);
        if elapsed >= Duration::from_secs(1) {
            self.rate = self.count as f32 / elapsed.as_secs_f32();
            self.count = 0;
            self.window_start = Some(now);
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }
}

/// Motion system that keeps everything in memory and moves nothing.
///
/// Used when no external motion process is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct LoopbackMotion {
    pub last_pose: Pose,
    pub last_target: Option<TargetPose>,
    pub movement_enabled: bool,
    pub pose_updates: u64,
    pub target_updates: u64,
    meter: RateMeter,
}

impl LoopbackMotion {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MotionSystem for LoopbackMotion {
    fn update_pose(&mut self, pose: &Pose, fresh: bool) {
        self.last_pose = pose.clone();
        self.pose_updates += 1;
        if fresh {
            self.meter.record();
        }
    }

    fn update_target(&mut self, target: &TargetPose) {
        self.last_target = Some(*target);
        self.target_updates += 1;
    }

    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    fn copy_current_pose_to_target(&mut self) -> Option<TargetPose> {
        tool_transform_from_pose(&self.last_pose)
    }

    fn live_transform(&self) -> Option<TargetPose> {
        tool_transform_from_pose(&self.last_pose)
    }

    fn update_rate(&self) -> f32 {
        self.meter.rate()
    }
}
