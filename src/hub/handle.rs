//! HubHandle - public API for the hub actor
//!
//! Cloneable; every method only enqueues. Queries wait on a oneshot reply.

use rosc::OscMessage;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::commands::HubCommand;
use crate::clients::Slot;
use crate::midi::MidiEvent;
use crate::session::{EventSink, SessionEvent};

pub type HubReceiver = mpsc::UnboundedReceiver<HubCommand>;

#[derive(Clone)]
pub struct HubHandle {
    cmd_tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    pub fn new(cmd_tx: mpsc::UnboundedSender<HubCommand>) -> Self {
        Self { cmd_tx }
    }

    /// Create the hub queue
    ///
    /// The handle exists before the actor so the session model and MIDI proxy
    /// can be built with callbacks that feed the queue.
    pub fn channel() -> (Self, HubReceiver) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (Self::new(cmd_tx), cmd_rx)
    }

    // =========================================================================
    // Fire-and-forget
    // =========================================================================

    pub fn inbound(&self, message: OscMessage, from: SocketAddr) {
        let _ = self.cmd_tx.send(HubCommand::Inbound { message, from });
    }

    pub fn session_event(&self, event: SessionEvent) {
        let _ = self.cmd_tx.send(HubCommand::Session(event));
    }

    pub fn midi_event(&self, event: MidiEvent) {
        let _ = self.cmd_tx.send(HubCommand::Midi(event));
    }

    pub fn disconnect(&self, slot: Slot) {
        let _ = self.cmd_tx.send(HubCommand::Disconnect { slot });
    }

    /// Sink for the session model; each notification becomes a hub command
    pub fn event_sink(&self) -> EventSink {
        let handle = self.clone();
        Arc::new(move |event| handle.session_event(event))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Register `slot`; resolves after the snapshot has been sent.
    /// Returns false when rejected or when the actor is gone.
    pub async fn connect(&self, slot: Slot) -> bool {
        let (response_tx, response_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(HubCommand::Connect {
                slot,
                response: response_tx,
            })
            .is_err()
        {
            return false;
        }
        response_rx.await.unwrap_or(false)
    }

    pub async fn active_slots(&self) -> Vec<Slot> {
        let (response_tx, response_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(HubCommand::ActiveSlots {
                response: response_tx,
            })
            .is_err()
        {
            return Vec::new();
        }
        response_rx.await.unwrap_or_default()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn is_alive(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(HubCommand::Shutdown);
    }
}
