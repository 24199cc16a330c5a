//! Broadcast bus - the single fan-out primitive
//!
//! Stateless: every call is parameterized by the pool and active set it is
//! handed. Send failures are isolated per client; they are logged, counted,
//! and never stop the loop or deactivate the client.

use rosc::OscMessage;
use std::collections::BTreeSet;
use tracing::trace;

use super::endpoint::{Endpoint, Slot};
use super::pool::ConnectionPool;

/// Anything a mirror can emit a state message into
///
/// Implemented by the registry (fan-out to every active client) and by
/// [`Recipient`] (snapshot replay to one joining client), so mirrors use one
/// code path for both and clients see identical message shapes.
pub trait Outbound {
    fn emit(&self, msg: &OscMessage);
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub sent: usize,
    pub failed: usize,
}

/// Send `msg` to every active slot that has a pool endpoint
pub fn fan_out(pool: &ConnectionPool, active: &BTreeSet<Slot>, msg: &OscMessage) -> Delivery {
    let mut delivery = Delivery::default();
    for slot in active {
        let Some(endpoint) = pool.get(*slot) else {
            continue;
        };
        if send_to(endpoint, msg) {
            delivery.sent += 1;
        } else {
            delivery.failed += 1;
        }
    }
    delivery
}

/// Single-target send with the same failure policy as [`fan_out`]
///
/// Returns whether the datagram was handed to the transport.
pub fn send_to(endpoint: &dyn Endpoint, msg: &OscMessage) -> bool {
    match endpoint.send(msg) {
        Ok(()) => true,
        Err(e) => {
            trace!(slot = %endpoint.slot(), addr = %msg.addr, "Send dropped: {}", e);
            false
        }
    }
}

/// One joining client, as seen by snapshot providers
pub struct Recipient<'a> {
    endpoint: &'a dyn Endpoint,
}

impl<'a> Recipient<'a> {
    pub fn new(endpoint: &'a dyn Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn slot(&self) -> Slot {
        self.endpoint.slot()
    }
}

impl Outbound for Recipient<'_> {
    fn emit(&self, msg: &OscMessage) {
        send_to(self.endpoint, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::Wire;
    use crate::osc;

    fn active(ports: &[u16]) -> BTreeSet<Slot> {
        ports.iter().copied().map(Slot::new).collect()
    }

    #[test]
    fn test_fan_out_reaches_only_active_slots() {
        let wire = Wire::new();
        let pool = wire.pool(9001..=9004);
        let msg = osc::message(osc::addr::PROJECT, vec![]);

        let delivery = fan_out(&pool, &active(&[9001, 9003]), &msg);

        assert_eq!(delivery, Delivery { sent: 2, failed: 0 });
        assert_eq!(wire.take_for(9001).len(), 1);
        assert_eq!(wire.take_for(9003).len(), 1);
        assert!(wire.take_for(9002).is_empty());
        assert!(wire.take_for(9004).is_empty());
    }

    #[test]
    fn test_failure_is_isolated() {
        let wire = Wire::new();
        let pool = wire.pool(9001..=9003);
        wire.set_failing(9002, true);
        let msg = osc::message(osc::addr::PROJECT, vec![]);

        let delivery = fan_out(&pool, &active(&[9001, 9002, 9003]), &msg);

        assert_eq!(delivery, Delivery { sent: 2, failed: 1 });
        assert_eq!(wire.take_for(9001).len(), 1);
        assert_eq!(wire.take_for(9003).len(), 1);
    }

    #[test]
    fn test_active_slot_without_endpoint_is_skipped() {
        let wire = Wire::new();
        let pool = wire.pool(9001..=9001);
        let msg = osc::message(osc::addr::PROJECT, vec![]);

        let delivery = fan_out(&pool, &active(&[9001, 9999]), &msg);
        assert_eq!(delivery, Delivery { sent: 1, failed: 0 });
    }

    #[test]
    fn test_fan_out_order_is_ascending() {
        let wire = Wire::new();
        let pool = wire.pool(9001..=9003);
        let msg = osc::message(osc::addr::PROJECT, vec![]);

        fan_out(&pool, &active(&[9003, 9001, 9002]), &msg);

        let order: Vec<u16> = wire.take().into_iter().map(|(slot, _)| slot.port()).collect();
        assert_eq!(order, vec![9001, 9002, 9003]);
    }

    #[test]
    fn test_recipient_swallows_failure() {
        let wire = Wire::new();
        let endpoint = wire.endpoint(9001);
        wire.set_failing(9001, true);

        let recipient = Recipient::new(endpoint.as_ref());
        recipient.emit(&osc::message(osc::addr::PROJECT, vec![]));

        assert_eq!(recipient.slot(), Slot::new(9001));
        assert!(wire.take().is_empty());
    }
}
