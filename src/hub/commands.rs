//! Commands accepted by the hub actor
//!
//! Fire-and-forget commands carry notifications and inbound traffic; the
//! request-response commands answer through a oneshot channel.

use rosc::OscMessage;
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::clients::Slot;
use crate::midi::MidiEvent;
use crate::osc;
use crate::session::SessionEvent;

pub enum HubCommand {
    /// Decoded message from the OSC server socket
    Inbound {
        message: OscMessage,
        from: SocketAddr,
    },
    /// Change notification from the session model
    Session(SessionEvent),
    /// Message from the MIDI input port
    Midi(MidiEvent),

    Connect {
        slot: Slot,
        response: oneshot::Sender<bool>,
    },
    Disconnect {
        slot: Slot,
    },
    ActiveSlots {
        response: oneshot::Sender<Vec<Slot>>,
    },

    Shutdown,
}

// Manual Debug: oneshot senders carry nothing useful to print
impl std::fmt::Debug for HubCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubCommand::Inbound { message, from } => f
                .debug_struct("Inbound")
                .field("message", &osc::describe(message))
                .field("from", from)
                .finish(),
            HubCommand::Session(event) => f.debug_tuple("Session").field(event).finish(),
            HubCommand::Midi(event) => f.debug_tuple("Midi").field(event).finish(),
            HubCommand::Connect { slot, .. } => f
                .debug_struct("Connect")
                .field("slot", slot)
                .finish_non_exhaustive(),
            HubCommand::Disconnect { slot } => {
                f.debug_struct("Disconnect").field("slot", slot).finish()
            }
            HubCommand::ActiveSlots { .. } => write!(f, "ActiveSlots"),
            HubCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}
