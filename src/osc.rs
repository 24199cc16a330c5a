//! OSC message helpers
//!
//! Wire framing is delegated to `rosc`. This module holds the stable address
//! namespace, argument coercion for inbound messages, and packet flattening.

use rosc::{OscMessage, OscPacket, OscType};

/// Outbound state addresses (bit-for-bit contract with clients)
pub mod addr {
    pub const PROJECT: &str = "/state/project";
    pub const TRANSPORT: &str = "/state/transport";
    pub const CURSOR_TRACK: &str = "/state/cursor_track";
    pub const DEVICE: &str = "/state/device";
    pub const REMOTE_CONTROL_PAGE: &str = "/state/remote_control/page";
    pub const REMOTE_CONTROL_PARAM: &str = "/state/remote_control/param";
    pub const TRACK: &str = "/state/track";
    pub const TRACK_BANK: &str = "/state/track_bank";
    pub const CLIP: &str = "/state/clip";
    pub const MIDI_IN: &str = "/midi/in";
    pub const MIDI_SYSEX_IN: &str = "/midi/sysex/in";
    pub const STATUS_REPLY: &str = "/status/reply";
}

/// Build an outbound message
pub fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
    OscMessage {
        addr: addr.to_string(),
        args,
    }
}

/// Booleans travel as 0/1 integers
pub fn flag(value: bool) -> OscType {
    OscType::Int(i32::from(value))
}

/// Coerce a positional argument to an integer.
///
/// Any numeric type is accepted (floats truncate), matching how loosely typed
/// OSC senders behave in practice. Missing or non-numeric arguments yield `None`.
pub fn int_arg(args: &[OscType], index: usize) -> Option<i32> {
    match args.get(index)? {
        OscType::Int(v) => Some(*v),
        OscType::Long(v) => i32::try_from(*v).ok(),
        OscType::Float(v) => Some(*v as i32),
        OscType::Double(v) => Some(*v as i32),
        OscType::Bool(v) => Some(i32::from(*v)),
        _ => None,
    }
}

/// Coerce a positional argument to a float
pub fn float_arg(args: &[OscType], index: usize) -> Option<f64> {
    match args.get(index)? {
        OscType::Float(v) => Some(f64::from(*v)),
        OscType::Double(v) => Some(*v),
        OscType::Int(v) => Some(f64::from(*v)),
        OscType::Long(v) => Some(*v as f64),
        _ => None,
    }
}

/// Positional string argument
pub fn string_arg(args: &[OscType], index: usize) -> Option<&str> {
    match args.get(index)? {
        OscType::String(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Flatten a packet (bundles may nest) into its messages, in order
pub fn flatten(packet: OscPacket) -> Vec<OscMessage> {
    let mut out = Vec::new();
    collect(packet, &mut out);
    out
}

fn collect(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                collect(inner, out);
            }
        }
    }
}

/// Render a message for log output: `/addr arg arg ...`
pub fn describe(msg: &OscMessage) -> String {
    let mut text = msg.addr.clone();
    for arg in &msg.args {
        text.push(' ');
        match arg {
            OscType::Int(v) => text.push_str(&v.to_string()),
            OscType::Float(v) => text.push_str(&v.to_string()),
            OscType::Double(v) => text.push_str(&v.to_string()),
            OscType::Long(v) => text.push_str(&v.to_string()),
            OscType::String(s) => {
                text.push('"');
                text.push_str(s);
                text.push('"');
            }
            other => text.push_str(&format!("{:?}", other)),
        }
    }
    text
}
