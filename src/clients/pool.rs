//! Fixed pool of pre-established client endpoints
//!
//! Built once at startup and read-only afterwards. Joining or leaving never
//! creates or tears down an endpoint; it only flips the slot's active flag in
//! the registry.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

use super::endpoint::{Endpoint, Slot, UdpEndpoint};

/// Slot -> endpoint map, ordered by slot number
#[derive(Default)]
pub struct ConnectionPool {
    endpoints: BTreeMap<Slot, Box<dyn Endpoint>>,
}

impl ConnectionPool {
    /// Build a pool from already established endpoints (duplicates: last one wins)
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = Box<dyn Endpoint>>) -> Self {
        let endpoints = endpoints
            .into_iter()
            .map(|endpoint| (endpoint.slot(), endpoint))
            .collect();
        Self { endpoints }
    }

    /// Establish one UDP endpoint per slot in `range`
    ///
    /// Each slot is established independently; a slot that fails is logged
    /// and left out of the pool, so it can never become active.
    pub async fn preallocate(host: &str, range: RangeInclusive<u16>) -> Self {
        let mut endpoints: BTreeMap<Slot, Box<dyn Endpoint>> = BTreeMap::new();

        for port in range.clone() {
            let slot = Slot::new(port);
            match UdpEndpoint::establish(host, slot).await {
                Ok(endpoint) => {
                    debug!(slot = %slot, target = %endpoint.target(), "Endpoint established");
                    endpoints.insert(slot, Box::new(endpoint));
                }
                Err(e) => {
                    warn!(slot = %slot, "Excluding slot from pool: {:#}", e);
                }
            }
        }

        info!(
            "Pre-allocated {} client connections ({}-{})",
            endpoints.len(),
            range.start(),
            range.end()
        );

        Self { endpoints }
    }

    pub fn get(&self, slot: Slot) -> Option<&dyn Endpoint> {
        self.endpoints.get(&slot).map(|endpoint| endpoint.as_ref())
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.endpoints.contains_key(&slot)
    }

    /// All pool members in ascending order
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.endpoints.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::Wire;

    #[test]
    fn test_pool_membership() {
        let wire = Wire::new();
        let pool = wire.pool(9001..=9004);

        assert_eq!(pool.len(), 4);
        assert!(pool.contains(Slot::new(9001)));
        assert!(pool.contains(Slot::new(9004)));
        assert!(!pool.contains(Slot::new(9005)));
        assert_eq!(pool.get(Slot::new(9003)).map(|e| e.slot()), Some(Slot::new(9003)));
        assert!(pool.get(Slot::new(9000)).is_none());
    }

    #[test]
    fn test_slots_are_ordered() {
        let wire = Wire::new();
        let pool = ConnectionPool::from_endpoints([
            wire.endpoint(9003),
            wire.endpoint(9001),
            wire.endpoint(9002),
        ]);
        let slots: Vec<u16> = pool.slots().map(Slot::port).collect();
        assert_eq!(slots, vec![9001, 9002, 9003]);
    }

    #[tokio::test]
    async fn test_preallocate_local_range() {
        let pool = ConnectionPool::preallocate("127.0.0.1", 39101..=39104).await;
        assert_eq!(pool.len(), 4);
        assert!(pool.contains(Slot::new(39101)));
        assert!(pool.contains(Slot::new(39104)));
    }

    #[tokio::test]
    async fn test_preallocate_excludes_unresolvable_slots() {
        let pool = ConnectionPool::preallocate("host.invalid", 39201..=39202).await;
        assert!(pool.is_empty());
    }
}
