//! HubActor - the single writer
//!
//! Owns the hub core, the session model and the optional MIDI proxy, and
//! drains the hub queue one command at a time. Every registry mutation,
//! mirror update and broadcast happens on this task.

use rosc::OscMessage;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::commands::HubCommand;
use super::core::HubCore;
use super::handle::HubReceiver;
use crate::config::ViewConfig;
use crate::midi::MidiProxy;
use crate::osc;
use crate::router::{self, Route};
use crate::session::Session;

pub struct HubActor {
    core: HubCore,
    session: Box<dyn Session>,
    midi: Option<MidiProxy>,
    view: ViewConfig,
    command_rx: HubReceiver,
}

impl HubActor {
    pub fn new(
        command_rx: HubReceiver,
        core: HubCore,
        session: Box<dyn Session>,
        midi: Option<MidiProxy>,
        view: ViewConfig,
    ) -> Self {
        Self {
            core,
            session,
            midi,
            view,
            command_rx,
        }
    }

    /// Start the run loop on a tokio task
    pub fn spawn(self) -> JoinHandle<()> {
        let handle = tokio::spawn(self.run());
        info!("Hub actor spawned");
        handle
    }

    async fn run(mut self) {
        // Initial values come back through the queue like any other change
        self.session.publish_all();
        debug!("Hub run loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            trace!(?cmd, "Processing command");

            match cmd {
                HubCommand::Inbound { message, from } => self.handle_inbound(message, from),
                HubCommand::Session(event) => self.core.apply(event),
                HubCommand::Midi(event) => {
                    self.core.broadcast(&event.to_message());
                }
                HubCommand::Connect { slot, response } => {
                    let joined = self.core.connect(slot);
                    let _ = response.send(joined);
                }
                HubCommand::Disconnect { slot } => self.core.disconnect(slot),
                HubCommand::ActiveSlots { response } => {
                    let _ = response.send(self.core.registry().active_slots());
                }
                HubCommand::Shutdown => {
                    info!("Hub received shutdown command");
                    break;
                }
            }
        }

        info!("Hub stopped");
    }

    fn handle_inbound(&mut self, message: OscMessage, from: SocketAddr) {
        let route = match router::route(&message, &self.view) {
            Ok(route) => route,
            Err(e) => {
                debug!(%from, "Ignoring {}: {}", osc::describe(&message), e);
                return;
            }
        };
        debug!(%from, ?route, "Inbound {}", message.addr);

        match route {
            Route::Connect(slot) => {
                self.core.connect(slot);
            }
            Route::Disconnect(slot) => self.core.disconnect(slot),
            Route::Status(slot) => {
                self.core.status(slot);
            }
            Route::Session(request) => self.session.request(request),
            Route::MidiSend {
                channel,
                status,
                data1,
                data2,
            } => match self.midi.as_mut() {
                Some(midi) => {
                    if let Err(e) = midi.send_short(channel, status, data1, data2) {
                        warn!("MIDI send failed: {}", e);
                    }
                }
                None => debug!("MIDI proxy disabled, dropping /midi/send"),
            },
            Route::SysexSend(hex) => match self.midi.as_mut() {
                Some(midi) => {
                    if let Err(e) = midi.send_sysex(&hex) {
                        warn!("Ignoring /midi/sysex/send {:?}: {}", hex, e);
                    }
                }
                None => debug!("MIDI proxy disabled, dropping /midi/sysex/send"),
            },
        }
    }
}
