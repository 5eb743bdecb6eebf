//! Pose stream receiver
//!
//! A delivery thread owns the UDP socket and queues every decoded message.
//! The frame loop drains the whole queue once per tick and keeps only the
//! newest message; older ones are stale by the time anyone looks at them.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::OscMessage;
use tracing::{debug, info, trace, warn};
use twinview_core::{Pose, PoseSource};

use crate::decode::{decode_pose, flatten_packet};
use crate::{OscError, Result};

pub const DEFAULT_POSE_PORT: u16 = 12345;

/// How often the delivery thread wakes up to check for shutdown
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Undrained messages kept before the oldest are dropped
const MAX_QUEUED: usize = 256;

type Queue = Arc<Mutex<VecDeque<OscMessage>>>;

pub struct PoseReceiver {
    local_addr: SocketAddr,
    queue: Queue,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl PoseReceiver {
    /// Bind `addr` and start the delivery thread. With `address_filter` set,
    /// messages to any other OSC address are discarded on arrival.
    pub fn bind(addr: &str, address_filter: Option<String>) -> Result<Self> {
        let socket = UdpSocket::bind(addr).map_err(|source| OscError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        let local_addr = socket.local_addr()?;

        let queue: Queue = Arc::default();
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let queue = queue.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("osc-pose-rx".to_string())
                .spawn(move || deliver(socket, queue, running, address_filter))?
        };

        info!("Listening for poses on {}", local_addr);
        Ok(Self {
            local_addr,
            queue,
            running,
            worker: Some(worker),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Messages queued and not yet drained
    pub fn pending(&self) -> usize {
        match self.queue.lock() {
            Ok(queue) => queue.len(),
            Err(_) => 0,
        }
    }

    /// Stop the delivery thread and wait for it. Called on drop.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("OSC delivery thread panicked");
            }
            debug!("OSC receiver on {} stopped", self.local_addr);
        }
    }
}

impl PoseSource for PoseReceiver {
    fn drain_latest(&mut self) -> Option<Pose> {
        let mut queue = match self.queue.lock() {
            Ok(queue) => queue,
            Err(_) => {
                warn!("OSC queue lock poisoned; treating drain as empty");
                return None;
            }
        };
        let mut latest = None;
        while let Some(msg) = queue.pop_front() {
            latest = Some(msg);
        }
        drop(queue);
        latest.as_ref().map(decode_pose)
    }
}

impl Drop for PoseReceiver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn deliver(socket: UdpSocket, queue: Queue, running: Arc<AtomicBool>, filter: Option<String>) {
    let mut buf = [0u8; rosc::decoder::MTU];
    let mut messages = Vec::new();

    while running.load(Ordering::Relaxed) {
        let (size, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                warn!("OSC receive error: {}", e);
                continue;
            }
        };

        match rosc::decoder::decode_udp(&buf[..size]) {
            Ok((_, packet)) => flatten_packet(packet, &mut messages),
            Err(e) => {
                debug!(%from, "Dropping undecodable OSC datagram: {:?}", e);
                continue;
            }
        }
        if let Some(filter) = &filter {
            messages.retain(|m| &m.addr == filter);
        }
        if messages.is_empty() {
            continue;
        }

        match queue.lock() {
            Ok(mut queue) => enqueue(&mut queue, &mut messages),
            Err(_) => {
                warn!("OSC queue lock poisoned; delivery thread exiting");
                return;
            }
        }
    }
}

/// Append `messages` and drop from the front past [`MAX_QUEUED`]; only the
/// newest message is ever decoded, so the oldest go first.
fn enqueue(queue: &mut VecDeque<OscMessage>, messages: &mut Vec<OscMessage>) {
    queue.extend(messages.drain(..));
    if queue.len() > MAX_QUEUED {
        let excess = queue.len() - MAX_QUEUED;
        queue.drain(..excess);
        trace!(dropped = excess, "Pose queue full");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{encoder, OscBundle, OscPacket, OscTime, OscType};
    use std::time::Instant;

    fn send(to: SocketAddr, packet: &OscPacket) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let bytes = encoder::encode(packet).unwrap();
        socket.send_to(&bytes, to).unwrap();
    }

    fn pose_packet(addr: &str, joints: &[f32]) -> OscPacket {
        OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args: joints.iter().map(|j| OscType::Float(*j)).collect(),
        })
    }

    fn wait_for(receiver: &PoseReceiver, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while receiver.pending() < count && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_drain_returns_newest_pose() {
        let mut receiver = PoseReceiver::bind("127.0.0.1:0", None).unwrap();
        let addr = receiver.local_addr();
        send(addr, &pose_packet("/pose", &[1.0, 1.0, 1.0]));
        wait_for(&receiver, 1);
        send(addr, &pose_packet("/pose", &[2.0, 2.0, 2.0]));
        wait_for(&receiver, 2);
        send(addr, &pose_packet("/pose", &[3.0, 4.0, 5.0]));
        wait_for(&receiver, 3);

        assert_eq!(receiver.drain_latest(), Some(Pose::new(vec![3.0, 4.0, 5.0])));
        assert_eq!(receiver.pending(), 0);
        assert_eq!(receiver.drain_latest(), None);
    }

    #[test]
    fn test_bundle_contents_are_queued() {
        let mut receiver = PoseReceiver::bind("127.0.0.1:0", None).unwrap();
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime::from((0, 1)),
            content: vec![
                pose_packet("/pose", &[1.0]),
                pose_packet("/pose", &[2.0]),
            ],
        });
        send(receiver.local_addr(), &bundle);
        wait_for(&receiver, 2);
        assert_eq!(receiver.drain_latest(), Some(Pose::new(vec![2.0])));
    }

    #[test]
    fn test_address_filter() {
        let mut receiver =
            PoseReceiver::bind("127.0.0.1:0", Some("/robot/joints".to_string())).unwrap();
        let addr = receiver.local_addr();
        send(addr, &pose_packet("/robot/joints", &[7.0]));
        wait_for(&receiver, 1);
        send(addr, &pose_packet("/other", &[9.0]));
        // Give the filtered datagram time to arrive and be discarded
        thread::sleep(Duration::from_millis(50));
        assert_eq!(receiver.drain_latest(), Some(Pose::new(vec![7.0])));
    }

    #[test]
    fn test_garbage_datagrams_are_dropped() {
        let mut receiver = PoseReceiver::bind("127.0.0.1:0", None).unwrap();
        let addr = receiver.local_addr();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.send_to(b"not osc", addr).unwrap();
        send(addr, &pose_packet("/pose", &[4.0]));
        wait_for(&receiver, 1);
        assert_eq!(receiver.drain_latest(), Some(Pose::new(vec![4.0])));
    }

    #[test]
    fn test_bind_failure_is_reported() {
        let first = PoseReceiver::bind("127.0.0.1:0", None).unwrap();
        let taken = first.local_addr().to_string();
        let err = PoseReceiver::bind(&taken, None).err().unwrap();
        assert!(matches!(err, OscError::Bind { .. }));
        assert!(err.to_string().contains(&taken));
    }

    #[test]
    fn test_shutdown_joins_thread() {
        let mut receiver = PoseReceiver::bind("127.0.0.1:0", None).unwrap();
        receiver.shutdown();
        assert!(receiver.worker.is_none());
        receiver.shutdown();
    }

    #[test]
    fn test_queue_is_capped_keeping_newest() {
        let mut queue = VecDeque::new();
        let mut batch: Vec<OscMessage> = (0..MAX_QUEUED + 40)
            .map(|i| OscMessage {
                addr: "/pose".to_string(),
                args: vec![OscType::Int(i as i32)],
            })
            .collect();
        enqueue(&mut queue, &mut batch);
        assert!(batch.is_empty());
        assert_eq!(queue.len(), MAX_QUEUED);
        assert_eq!(queue.front().unwrap().args, vec![OscType::Int(40)]);
        assert_eq!(
            queue.back().unwrap().args,
            vec![OscType::Int((MAX_QUEUED + 39) as i32)]
        );
    }
}
