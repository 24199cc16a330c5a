//! Snapshot coordinator
//!
//! Holds the ordered list of snapshot providers. Replay runs them in
//! registration order against one joining client, so every join sees the same
//! message sequence.

use crate::clients::Outbound;

type Provider<S> = Box<dyn Fn(&S, &dyn Outbound) + Send>;

/// Ordered providers over some state `S` (the gateway's mirror set)
pub struct SnapshotCoordinator<S> {
    providers: Vec<Provider<S>>,
}

impl<S> Default for SnapshotCoordinator<S> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
        }
    }
}

impl<S> SnapshotCoordinator<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; providers live for the process lifetime
    pub fn add_provider<F>(&mut self, provider: F)
    where
        F: Fn(&S, &dyn Outbound) + Send + 'static,
    {
        self.providers.push(Box::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run every provider, in order, against `to`
    pub fn replay(&self, state: &S, to: &dyn Outbound) {
        for provider in &self.providers {
            provider(state, to);
        }
    }
}
