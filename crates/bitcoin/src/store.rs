//! A concurrent store of unspent outputs, keyed by address.
//!
//! Writers for the same address are serialized by the map's shard lock, and different
//! addresses proceed concurrently. Every method takes `&self`, so one store can be shared
//! behind an `Arc` between the explorer sync task and any number of builders.

use std::collections::BTreeMap;

use dashmap::DashMap;
use tracing::debug;

use crate::types::{txin::Outpoint, utxo::UnspentOutput};

/// Unspent outputs per address, each set ordered by outpoint.
#[derive(Debug, Default)]
pub struct UnspentOutputStore {
    outputs: DashMap<String, BTreeMap<Outpoint, UnspentOutput>>,
}

impl UnspentOutputStore {
    /// Instantiate an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the address's outputs. Records sharing an outpoint collapse to the last one.
    /// Returns the number of outputs stored for the address.
    pub fn update<I>(&self, address: &str, outputs: I) -> usize
    where
        I: IntoIterator<Item = UnspentOutput>,
    {
        let set: BTreeMap<_, _> = outputs.into_iter().map(|o| (o.outpoint, o)).collect();
        let count = set.len();
        self.outputs.insert(address.to_owned(), set);
        debug!(address, count, "replaced unspent outputs");
        count
    }

    /// Insert or overwrite outputs by outpoint, keeping the address's other outputs. Returns
    /// the number of outputs stored for the address.
    pub fn merge<I>(&self, address: &str, outputs: I) -> usize
    where
        I: IntoIterator<Item = UnspentOutput>,
    {
        let mut entry = self.outputs.entry(address.to_owned()).or_default();
        entry.extend(outputs.into_iter().map(|o| (o.outpoint, o)));
        let count = entry.len();
        debug!(address, count, "merged unspent outputs");
        count
    }

    /// Drop spent or reorged outputs. Returns how many were removed.
    pub fn remove<'a, I>(&self, address: &str, outpoints: I) -> usize
    where
        I: IntoIterator<Item = &'a Outpoint>,
    {
        let removed = match self.outputs.get_mut(address) {
            Some(mut set) => outpoints
                .into_iter()
                .filter(|outpoint| set.remove(*outpoint).is_some())
                .count(),
            None => 0,
        };
        debug!(address, removed, "removed unspent outputs");
        removed
    }

    /// A snapshot of the address's outputs, in outpoint order.
    pub fn outputs(&self, address: &str) -> Vec<UnspentOutput> {
        self.outputs
            .get(address)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// The sum of the address's output amounts. Saturates rather than overflowing.
    pub fn balance(&self, address: &str) -> u64 {
        self.outputs
            .get(address)
            .map(|set| set.values().fold(0u64, |acc, o| acc.saturating_add(o.amount)))
            .unwrap_or_default()
    }

    /// Forget the address entirely.
    pub fn clear(&self, address: &str) {
        self.outputs.remove(address);
    }

    /// The addresses with an entry in the store.
    pub fn addresses(&self) -> Vec<String> {
        self.outputs.iter().map(|e| e.key().clone()).collect()
    }
}
