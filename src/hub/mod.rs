//! Hub - single-writer integration of clients, mirrors and the session model
//!
//! ```text
//! OSC server ──┐
//! session sink ├──► hub queue ──► HubActor ──► HubCore ──► ClientRegistry ──► UDP
//! MIDI input ──┘                    │
//!                                   └──► Session / MidiProxy
//! ```

mod actor;
mod commands;
mod core;
mod handle;


pub use actor::HubActor;
pub use commands::HubCommand;
pub use self::core::HubCore;
pub use handle::{HubHandle, HubReceiver};
