//! Joint poses from the live robot and the operator's target pose

use glam::{Quat, Vec3};
use std::collections::VecDeque;

/// Joint values describing the robot at one instant.
///
/// The joint count is whatever the sender put on the wire; it is not checked
/// here. A newer pose replaces an older one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose(pub Vec<f64>);

impl Pose {
    pub fn new(joints: Vec<f64>) -> Self {
        Self(joints)
    }

    pub fn joints(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for Pose {
    fn from(joints: Vec<f64>) -> Self {
        Self(joints)
    }
}

/// Desired end-effector pose edited through the target handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl TargetPose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }
}

impl Default for TargetPose {
    fn default() -> Self {
        Self {
            position: Vec3::splat(500.0),
            orientation: Quat::IDENTITY,
        }
    }
}

/// Something the frame loop can pull decoded poses from once per tick.
pub trait PoseSource {
    /// Drain everything queued since the last call and return only the
    /// newest pose. Earlier entries from the same drain are stale and dropped.
    /// Returns `None` when nothing arrived.
    fn drain_latest(&mut self) -> Option<Pose>;
}

/// In-memory pose source, used for offline runs and tests
#[derive(Debug, Default)]
pub struct QueuedPoses {
    queue: VecDeque<Pose>,
}

impl QueuedPoses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pose: impl Into<Pose>) {
        self.queue.push_back(pose.into());
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl PoseSource for QueuedPoses {
    fn drain_latest(&mut self) -> Option<Pose> {
        let mut latest = None;
        while let Some(pose) = self.queue.pop_front() {
            latest = Some(pose);
        }
        latest
    }
}
