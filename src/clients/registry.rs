//! Client registry - which pool slots are currently subscribed
//!
//! Pool membership is static; the active set is a plain overlay on top of it.
//! Joining runs the caller's snapshot replay against the joining endpoint
//! before `register` returns, so a new client's first datagrams are always a
//! complete snapshot.

use rosc::OscMessage;
use std::collections::BTreeSet;
use tracing::trace;

use super::bus::{self, Delivery, Outbound, Recipient};
use super::endpoint::Slot;
use super::pool::ConnectionPool;

pub struct ClientRegistry {
    pool: ConnectionPool,
    active: BTreeSet<Slot>,
}

impl ClientRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            active: BTreeSet::new(),
        }
    }

    /// Activate `slot` and replay the snapshot to it
    ///
    /// Returns false, with no state change and no replay, when the slot has no
    /// endpoint in the pool. Re-registering an active slot replays the
    /// snapshot again.
    pub fn register<F>(&mut self, slot: Slot, replay: F) -> bool
    where
        F: FnOnce(&Recipient<'_>),
    {
        let Some(endpoint) = self.pool.get(slot) else {
            return false;
        };
        self.active.insert(slot);
        replay(&Recipient::new(endpoint));
        true
    }

    /// Deactivate `slot`; unknown or inactive slots are a no-op.
    /// Returns whether the slot was active.
    pub fn unregister(&mut self, slot: Slot) -> bool {
        self.active.remove(&slot)
    }

    /// Fan `msg` out to every active client
    pub fn broadcast(&self, msg: &OscMessage) -> Delivery {
        let delivery = bus::fan_out(&self.pool, &self.active, msg);
        trace!(
            addr = %msg.addr,
            sent = delivery.sent,
            failed = delivery.failed,
            "Broadcast"
        );
        delivery
    }

    /// Send one message to a pool member whether or not it is active
    ///
    /// Returns false when the slot has no endpoint or the send fails.
    pub fn send_to_slot(&self, slot: Slot, msg: &OscMessage) -> bool {
        self.pool
            .get(slot)
            .is_some_and(|endpoint| bus::send_to(endpoint, msg))
    }

    pub fn is_active(&self, slot: Slot) -> bool {
        self.active.contains(&slot)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.pool.contains(slot)
    }

    /// Active slots in ascending order
    pub fn active_slots(&self) -> Vec<Slot> {
        self.active.iter().copied().collect()
    }

    pub fn pool_slots(&self) -> Vec<Slot> {
        self.pool.slots().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}

impl Outbound for ClientRegistry {
    fn emit(&self, msg: &OscMessage) {
        self.broadcast(msg);
    }
}
