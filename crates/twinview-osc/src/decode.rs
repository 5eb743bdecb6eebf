//! OSC message to pose conversion

use rosc::{OscMessage, OscPacket, OscType};
use twinview_core::Pose;

/// Numeric value of one argument. Integers and floats widen to f64, booleans
/// read as 1/0, anything else (strings, blobs, nil, ...) reads as 0.
pub fn coerce_arg(arg: &OscType) -> f64 {
    match arg {
        OscType::Float(v) => *v as f64,
        OscType::Double(v) => *v,
        OscType::Int(v) => *v as f64,
        OscType::Long(v) => *v as f64,
        OscType::Bool(v) => {
            if *v {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// One pose from one message: argument `i` becomes joint `i`.
pub fn decode_pose(msg: &OscMessage) -> Pose {
    Pose::new(msg.args.iter().map(coerce_arg).collect())
}

/// Append every message in `packet` to `out`, bundles flattened in order.
pub fn flatten_packet(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten_packet(inner, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscTime};

    fn msg(args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: "/pose".to_string(),
            args,
        }
    }

    #[test]
    fn test_decode_mixed_numeric_args() {
        let pose = decode_pose(&msg(vec![
            OscType::Float(1.5),
            OscType::Double(2.25),
            OscType::Int(-3),
            OscType::Long(4),
        ]));
        assert_eq!(pose.joints(), &[1.5, 2.25, -3.0, 4.0]);
    }

    #[test]
    fn test_malformed_args_read_as_zero() {
        let pose = decode_pose(&msg(vec![
            OscType::String("elbow".to_string()),
            OscType::Bool(true),
            OscType::Nil,
            OscType::Float(7.0),
        ]));
        assert_eq!(pose.joints(), &[0.0, 1.0, 0.0, 7.0]);
    }

    #[test]
    fn test_empty_message_is_empty_pose() {
        assert!(decode_pose(&msg(vec![])).is_empty());
    }

    #[test]
    fn test_flatten_nested_bundles() {
        let packet = OscPacket::Bundle(OscBundle {
            timetag: OscTime::from((0, 1)),
            content: vec![
                OscPacket::Message(msg(vec![OscType::Int(1)])),
                OscPacket::Bundle(OscBundle {
                    timetag: OscTime::from((0, 1)),
                    content: vec![OscPacket::Message(msg(vec![OscType::Int(2)]))],
                }),
                OscPacket::Message(msg(vec![OscType::Int(3)])),
            ],
        });
        let mut out = Vec::new();
        flatten_packet(packet, &mut out);
        let firsts: Vec<f64> = out.iter().map(|m| coerce_arg(&m.args[0])).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0]);
    }
}
