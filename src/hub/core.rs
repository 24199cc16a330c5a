//! Synchronous hub core: registry, mirrors and snapshot coordinator
//!
//! No locks, no `.await`. The actor owns one of these and calls into it
//! sequentially.

use rosc::{OscMessage, OscType};
use tracing::{debug, info, warn};

use crate::clients::{ClientRegistry, Delivery, Slot};
use crate::config::ViewConfig;
use crate::mirrors::{Mirrors, SnapshotProvider};
use crate::osc;
use crate::session::{Session, SessionEvent};
use crate::snapshot::SnapshotCoordinator;

pub struct HubCore {
    registry: ClientRegistry,
    mirrors: Mirrors,
    snapshots: SnapshotCoordinator<Mirrors>,
}

impl HubCore {
    /// Wire every mirror to `session` and register snapshot providers in
    /// replay order
    pub fn new(registry: ClientRegistry, view: &ViewConfig, session: &mut dyn Session) -> Self {
        let mirrors = Mirrors::new(view, session);

        let mut snapshots: SnapshotCoordinator<Mirrors> = SnapshotCoordinator::new();
        snapshots.add_provider(|m, to| m.project.send_snapshot(to));
        snapshots.add_provider(|m, to| m.transport.send_snapshot(to));
        snapshots.add_provider(|m, to| m.cursor_track.send_snapshot(to));
        snapshots.add_provider(|m, to| m.device.send_snapshot(to));
        snapshots.add_provider(|m, to| m.remote_controls.send_snapshot(to));
        snapshots.add_provider(|m, to| m.track_bank.send_snapshot(to));
        snapshots.add_provider(|m, to| m.clip_grid.send_snapshot(to));

        Self {
            registry,
            mirrors,
            snapshots,
        }
    }

    /// Subscribe `slot` and replay the full snapshot to it
    pub fn connect(&mut self, slot: Slot) -> bool {
        let joined = self
            .registry
            .register(slot, |to| self.snapshots.replay(&self.mirrors, to));
        if joined {
            info!("Client connected on port {}", slot);
        } else {
            warn!(
                "Client port {} not in pre-allocated range {}",
                slot,
                self.range_label()
            );
        }
        joined
    }

    pub fn disconnect(&mut self, slot: Slot) {
        let was_active = self.registry.unregister(slot);
        info!(was_active, "Client disconnected from port {}", slot);
    }

    /// Reply on `reply`'s endpoint with `/status/reply i:pool_size i:active_count i:port...`
    ///
    /// The reply slot must be in the pool but need not be active.
    pub fn status(&self, reply: Slot) -> bool {
        if !self.registry.contains(reply) {
            warn!(
                "Status reply port {} not in pre-allocated range {}",
                reply,
                self.range_label()
            );
            return false;
        }

        let mut args = vec![
            OscType::Int(self.registry.pool_size() as i32),
            OscType::Int(self.registry.active_count() as i32),
        ];
        args.extend(
            self.registry
                .active_slots()
                .into_iter()
                .map(|slot| OscType::Int(i32::from(slot.port()))),
        );
        let sent = self
            .registry
            .send_to_slot(reply, &osc::message(osc::addr::STATUS_REPLY, args));
        debug!(sent, "Status reported to port {}", reply);
        sent
    }

    /// Apply one session notification; the owning mirror broadcasts
    pub fn apply(&mut self, event: SessionEvent) {
        self.mirrors.apply(event, &self.registry);
    }

    pub fn broadcast(&self, msg: &OscMessage) -> Delivery {
        self.registry.broadcast(msg)
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn mirrors(&self) -> &Mirrors {
        &self.mirrors
    }

    fn range_label(&self) -> String {
        let slots = self.registry.pool_slots();
        match (slots.first(), slots.last()) {
            (Some(first), Some(last)) => format!("{}-{}", first, last),
            _ => "(empty pool)".to_string(),
        }
    }
}
