//! MIDI proxy
//!
//! Bridges one MIDI input/output pair to the OSC clients. Input arrives on the
//! midir callback thread and is handed to a caller-supplied callback (the hub
//! queue), so broadcasts stay on the hub task. Output is driven by the hub.

use anyhow::{Context, Result};
use colored::*;
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use rosc::{OscMessage, OscType};
use std::fmt::Write as _;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::config::MidiConfig;
use crate::osc;

const CLIENT_NAME: &str = "harness-gw";

/// One inbound MIDI message, in the shape clients receive it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiEvent {
    Short {
        channel: u8,
        status: u8,
        data1: u8,
        data2: u8,
    },
    /// Full message including F0/F7, uppercase hex
    Sysex(String),
}

impl MidiEvent {
    /// Classify raw bytes from the input callback
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let (&first, rest) = data.split_first()?;
        if first < 0x80 {
            return None;
        }
        if first == 0xF0 {
            return Some(MidiEvent::Sysex(hex::encode_upper(data)));
        }
        Some(MidiEvent::Short {
            channel: first & 0x0F,
            status: first & 0xF0,
            data1: rest.first().copied().unwrap_or(0),
            data2: rest.get(1).copied().unwrap_or(0),
        })
    }

    pub fn to_message(&self) -> OscMessage {
        match self {
            MidiEvent::Short {
                channel,
                status,
                data1,
                data2,
            } => osc::message(
                osc::addr::MIDI_IN,
                vec![
                    OscType::Int(i32::from(*channel)),
                    OscType::Int(i32::from(*status)),
                    OscType::Int(i32::from(*data1)),
                    OscType::Int(i32::from(*data2)),
                ],
            ),
            MidiEvent::Sysex(hex) => {
                osc::message(osc::addr::MIDI_SYSEX_IN, vec![OscType::String(hex.clone())])
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("invalid sysex hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("sysex must start with F0 and end with F7")]
    Framing,
    #[error("MIDI send failed: {0}")]
    Send(#[from] midir::SendError),
}

/// Compose a short message from the OSC (channel, status, data1, data2) form
pub fn short_bytes(channel: u8, status: u8, data1: u8, data2: u8) -> [u8; 3] {
    [(status & 0xF0) | (channel & 0x0F), data1 & 0x7F, data2 & 0x7F]
}

/// Decode a client-supplied sysex hex string; whitespace is ignored
pub fn decode_sysex(text: &str) -> Result<Vec<u8>, MidiError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(compact)?;
    match (bytes.first(), bytes.last()) {
        (Some(0xF0), Some(0xF7)) if bytes.len() >= 2 => Ok(bytes),
        _ => Err(MidiError::Framing),
    }
}

/// Case-insensitive substring match on a port name
pub fn port_matches(name: &str, pattern: &str) -> bool {
    name.to_lowercase().contains(&pattern.to_lowercase())
}

/// First port whose name contains `pattern`
pub fn find_port<T: MidiIO>(io: &T, pattern: &str) -> Option<(T::Port, String)> {
    io.ports().into_iter().find_map(|port| {
        let name = io.port_name(&port).ok()?;
        port_matches(&name, pattern).then(|| {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            (port, name)
        })
    })
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}

/// Every MIDI port, formatted for `--list-ports`
pub fn list_ports_formatted() -> Result<String> {
    let inputs = port_names(&MidiInput::new(CLIENT_NAME).context("Failed to create MIDI input")?);
    let outputs =
        port_names(&MidiOutput::new(CLIENT_NAME).context("Failed to create MIDI output")?);

    let mut out = String::new();
    for (title, names) in [("MIDI Input Ports", inputs), ("MIDI Output Ports", outputs)] {
        let _ = writeln!(out, "{}", format!("=== {} ===", title).bold().cyan());
        if names.is_empty() {
            let _ = writeln!(out, "  {}", "(none)".dimmed());
        }
        for (i, name) in names.iter().enumerate() {
            let _ = writeln!(out, "  {}: {}", i.to_string().yellow(), name);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Open MIDI input/output pair
pub struct MidiProxy {
    output: MidiOutputConnection,
    _input: MidiInputConnection<()>,
    input_name: String,
    output_name: String,
}

impl MidiProxy {
    /// Connect both ports; `on_event` runs on the midir thread
    pub fn connect<F>(config: &MidiConfig, on_event: F) -> Result<Self>
    where
        F: Fn(MidiEvent) + Send + 'static,
    {
        let mut midi_in = MidiInput::new(CLIENT_NAME).context("Failed to create MIDI input")?;
        midi_in.ignore(Ignore::TimeAndActiveSense);
        let (in_port, input_name) = find_port(&midi_in, &config.input_port)
            .ok_or_else(|| anyhow::anyhow!("Input port '{}' not found", config.input_port))?;

        info!("Connecting to MIDI input port: {}", input_name);
        let input = midi_in
            .connect(
                &in_port,
                "harness-gw-in",
                move |_timestamp, data, _| match MidiEvent::from_bytes(data) {
                    Some(event) => on_event(event),
                    None => trace!("Dropping MIDI data: {}", hex::encode_upper(data)),
                },
                (),
            )
            .map_err(|e| anyhow::anyhow!("Failed to connect to input port: {}", e))?;

        let midi_out = MidiOutput::new(CLIENT_NAME).context("Failed to create MIDI output")?;
        let (out_port, output_name) = find_port(&midi_out, &config.output_port)
            .ok_or_else(|| anyhow::anyhow!("Output port '{}' not found", config.output_port))?;

        info!("Connecting to MIDI output port: {}", output_name);
        let output = midi_out
            .connect(&out_port, "harness-gw-out")
            .map_err(|e| anyhow::anyhow!("Failed to connect to output port: {}", e))?;

        Ok(Self {
            output,
            _input: input,
            input_name,
            output_name,
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn send_short(
        &mut self,
        channel: u8,
        status: u8,
        data1: u8,
        data2: u8,
    ) -> Result<(), MidiError> {
        let bytes = short_bytes(channel, status, data1, data2);
        self.output.send(&bytes)?;
        trace!("MIDI out: {}", hex::encode_upper(bytes));
        Ok(())
    }

    pub fn send_sysex(&mut self, text: &str) -> Result<(), MidiError> {
        let bytes = decode_sysex(text)?;
        self.output.send(&bytes)?;
        trace!("MIDI sysex out: {} bytes", bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_split() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x93, 60, 100]),
            Some(MidiEvent::Short {
                channel: 3,
                status: 0x90,
                data1: 60,
                data2: 100
            })
        );
    }

    #[test]
    fn test_two_byte_message_pads_data2() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xC1, 5]),
            Some(MidiEvent::Short {
                channel: 1,
                status: 0xC0,
                data1: 5,
                data2: 0
            })
        );
    }

    #[test]
    fn test_sysex_is_uppercase_hex_with_framing() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xF0, 0x7e, 0x7f, 0x06, 0x01, 0xF7]),
            Some(MidiEvent::Sysex("F07E7F0601F7".into()))
        );
    }

    #[test]
    fn test_running_status_and_empty_dropped() {
        assert_eq!(MidiEvent::from_bytes(&[]), None);
        assert_eq!(MidiEvent::from_bytes(&[0x40, 0x10]), None);
    }

    #[test]
    fn test_to_message() {
        let msg = MidiEvent::Short {
            channel: 0,
            status: 0xB0,
            data1: 7,
            data2: 64,
        }
        .to_message();
        assert_eq!(msg.addr, "/midi/in");
        assert_eq!(
            msg.args,
            vec![
                OscType::Int(0),
                OscType::Int(0xB0),
                OscType::Int(7),
                OscType::Int(64)
            ]
        );

        let msg = MidiEvent::Sysex("F0F7".into()).to_message();
        assert_eq!(msg.addr, "/midi/sysex/in");
        assert_eq!(msg.args, vec![OscType::String("F0F7".into())]);
    }

    #[test]
    fn test_short_bytes() {
        assert_eq!(short_bytes(2, 0x90, 60, 127), [0x92, 60, 127]);
        assert_eq!(short_bytes(0x12, 0x95, 0xFF, 0x80), [0x92, 0x7F, 0x00]);
    }

    #[test]
    fn test_decode_sysex() {
        assert_eq!(decode_sysex("F0 7E 7F F7").unwrap(), vec![0xF0, 0x7E, 0x7F, 0xF7]);
        assert_eq!(decode_sysex("f07ef7").unwrap(), vec![0xF0, 0x7E, 0xF7]);
        assert!(matches!(decode_sysex("F0 7G F7"), Err(MidiError::Hex(_))));
        assert!(matches!(decode_sysex("7E7F"), Err(MidiError::Framing)));
        assert!(matches!(decode_sysex(""), Err(MidiError::Framing)));
    }

    #[test]
    fn test_port_matches() {
        assert!(port_matches("loopMIDI Port Harness In", "harness in"));
        assert!(!port_matches("IAC Driver Bus 1", "harness"));
    }
}
