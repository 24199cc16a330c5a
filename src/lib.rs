//! Harness GW - OSC gateway mirroring live session state to remote clients
//!
//! A fixed pool of outbound UDP endpoints is created at startup; clients
//! subscribe by port with `/connect`, receive a full state snapshot, and then
//! every change pushed by the session model as whole-record updates.

pub mod clients;
pub mod config;
pub mod hub;
pub mod midi;
pub mod mirrors;
pub mod osc;
pub mod router;
pub mod server;
pub mod session;
pub mod snapshot;
