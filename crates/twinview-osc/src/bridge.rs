//! Motion bridge: forwards poses and the target to an external motion
//! process as OSC over UDP.
//!
//! Sends are fire-and-forget on a non-blocking socket so a slow or absent
//! peer never holds up a frame.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};
use tracing::{debug, info, warn};
use twinview_core::motion::tool_transform_from_pose;
use twinview_core::{MotionSystem, Pose, RateMeter, TargetPose};

use crate::{OscError, Result};

pub const POSE_ADDR: &str = "/twinview/pose";
pub const TARGET_ADDR: &str = "/twinview/target";
pub const MOVE_ADDR: &str = "/twinview/move";

pub fn pose_message(pose: &Pose) -> OscMessage {
    OscMessage {
        addr: POSE_ADDR.to_string(),
        args: pose.joints().iter().map(|j| OscType::Double(*j)).collect(),
    }
}

/// `x y z qx qy qz qw`
pub fn target_message(target: &TargetPose) -> OscMessage {
    let p = target.position;
    let q = target.orientation;
    OscMessage {
        addr: TARGET_ADDR.to_string(),
        args: [p.x, p.y, p.z, q.x, q.y, q.z, q.w]
            .into_iter()
            .map(OscType::Float)
            .collect(),
    }
}

pub fn move_message(enabled: bool) -> OscMessage {
    OscMessage {
        addr: MOVE_ADDR.to_string(),
        args: vec![OscType::Bool(enabled)],
    }
}

#[derive(Debug)]
pub struct OscMotionBridge {
    socket: UdpSocket,
    peer: SocketAddr,
    last_pose: Pose,
    movement_enabled: bool,
    meter: RateMeter,
    send_failures: u64,
}

impl OscMotionBridge {
    pub fn connect(peer: &str) -> Result<Self> {
        let peer = peer
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| OscError::InvalidAddress(peer.to_string()))?;
        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).map_err(|source| OscError::Bind {
            addr: local.to_string(),
            source,
        })?;
        socket.set_nonblocking(true)?;
        info!("Forwarding motion commands to {}", peer);
        Ok(Self {
            socket,
            peer,
            last_pose: Pose::default(),
            movement_enabled: false,
            meter: RateMeter::new(),
            send_failures: 0,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }

    fn send(&mut self, msg: OscMessage) {
        if let Err(e) = self.try_send(msg) {
            if self.send_failures == 0 {
                warn!("Motion bridge send to {} failed: {}", self.peer, e);
            } else {
                debug!("Motion bridge send to {} failed: {}", self.peer, e);
            }
            self.send_failures += 1;
        }
    }

    fn try_send(&self, msg: OscMessage) -> Result<()> {
        let bytes = encoder::encode(&OscPacket::Message(msg))?;
        self.socket.send_to(&bytes, self.peer)?;
        Ok(())
    }
}

impl MotionSystem for OscMotionBridge {
    fn update_pose(&mut self, pose: &Pose, fresh: bool) {
        self.last_pose.clone_from(pose);
        if fresh {
            self.meter.record();
        }
        self.send(pose_message(pose));
    }

    fn update_target(&mut self, target: &TargetPose) {
        self.send(target_message(target));
    }

    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
        self.send(move_message(enabled));
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

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::time::Duration;

    fn listener() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        socket
    }

    fn recv(socket: &UdpSocket) -> OscMessage {
        let mut buf = [0u8; rosc::decoder::MTU];
        let (size, _) = socket.recv_from(&mut buf).unwrap();
        match rosc::decoder::decode_udp(&buf[..size]).unwrap().1 {
            OscPacket::Message(msg) => msg,
            OscPacket::Bundle(_) => panic!("unexpected bundle"),
        }
    }

    #[test]
    fn test_target_message_layout() {
        let msg = target_message(&TargetPose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY));
        assert_eq!(msg.addr, TARGET_ADDR);
        assert_eq!(
            msg.args,
            vec![
                OscType::Float(1.0),
                OscType::Float(2.0),
                OscType::Float(3.0),
                OscType::Float(0.0),
                OscType::Float(0.0),
                OscType::Float(0.0),
                OscType::Float(1.0),
            ]
        );
    }

    #[test]
    fn test_bridge_sends_pose_target_and_move() {
        let peer = listener();
        let mut bridge = OscMotionBridge::connect(&peer.local_addr().unwrap().to_string()).unwrap();

        bridge.update_pose(&Pose::new(vec![10.0, 20.0, 30.0]), true);
        let msg = recv(&peer);
        assert_eq!(msg.addr, POSE_ADDR);
        assert_eq!(msg.args[2], OscType::Double(30.0));

        bridge.update_target(&TargetPose::default());
        assert_eq!(recv(&peer).addr, TARGET_ADDR);

        bridge.set_movement_enabled(true);
        let msg = recv(&peer);
        assert_eq!(msg.addr, MOVE_ADDR);
        assert_eq!(msg.args, vec![OscType::Bool(true)]);
        assert!(bridge.movement_enabled());
        assert_eq!(bridge.send_failures(), 0);
    }

    #[test]
    fn test_copy_uses_last_pose() {
        let peer = listener();
        let mut bridge = OscMotionBridge::connect(&peer.local_addr().unwrap().to_string()).unwrap();
        assert!(bridge.copy_current_pose_to_target().is_none());

        bridge.update_pose(&Pose::new(vec![100.0, 200.0, 300.0, 0.0, 0.0, 0.0]), true);
        let copied = bridge.copy_current_pose_to_target().unwrap();
        assert_eq!(copied.position, Vec3::new(100.0, 200.0, 300.0));
        assert_eq!(bridge.live_transform(), Some(copied));
    }

    #[test]
    fn test_unresolvable_peer() {
        assert!(OscMotionBridge::connect("not an address").is_err());
    }
}
