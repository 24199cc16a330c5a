//! In-memory endpoints for tests
//!
//! Every endpoint created from one [`Wire`] appends to the same log, so tests
//! can assert on ordering across clients as well as per client.

use parking_lot::Mutex;
use rosc::OscMessage;
use std::collections::HashSet;
use std::io;
use std::ops::RangeInclusive;
use std::sync::Arc;

use super::endpoint::{Endpoint, SendError, Slot};
use super::pool::ConnectionPool;

#[derive(Default)]
struct WireState {
    log: Vec<(Slot, OscMessage)>,
    failing: HashSet<Slot>,
}

#[derive(Clone, Default)]
pub struct Wire {
    state: Arc<Mutex<WireState>>,
}

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&self, port: u16) -> Box<dyn Endpoint> {
        Box::new(RecordingEndpoint {
            slot: Slot::new(port),
            state: self.state.clone(),
        })
    }

    pub fn pool(&self, range: RangeInclusive<u16>) -> ConnectionPool {
        ConnectionPool::from_endpoints(range.map(|port| self.endpoint(port)))
    }

    /// Make every send to `port` fail with an I/O error
    pub fn set_failing(&self, port: u16, failing: bool) {
        let mut state = self.state.lock();
        if failing {
            state.failing.insert(Slot::new(port));
        } else {
            state.failing.remove(&Slot::new(port));
        }
    }

    /// Drain the whole log in send order
    pub fn take(&self) -> Vec<(Slot, OscMessage)> {
        std::mem::take(&mut self.state.lock().log)
    }

    /// Drain only the messages sent to `port`, leaving the rest
    pub fn take_for(&self, port: u16) -> Vec<OscMessage> {
        let slot = Slot::new(port);
        let mut state = self.state.lock();
        let (mine, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut state.log).into_iter().partition(|(s, _)| *s == slot);
        state.log = rest;
        mine.into_iter().map(|(_, msg)| msg).collect()
    }

    /// Drain and return only the addresses sent to `port`
    pub fn addrs_for(&self, port: u16) -> Vec<String> {
        self.take_for(port).into_iter().map(|msg| msg.addr).collect()
    }
}

struct RecordingEndpoint {
    slot: Slot,
    state: Arc<Mutex<WireState>>,
}

impl Endpoint for RecordingEndpoint {
    fn slot(&self) -> Slot {
        self.slot
    }

    fn send(&self, msg: &OscMessage) -> Result<(), SendError> {
        let mut state = self.state.lock();
        if state.failing.contains(&self.slot) {
            return Err(SendError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "endpoint marked failing",
            )));
        }
        state.log.push((self.slot, msg.clone()));
        Ok(())
    }
}
