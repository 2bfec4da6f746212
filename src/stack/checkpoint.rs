//! Checkpoint Index
//!
//! Tracks, per checkpoint key, which activation indices published a value and
//! in what order. The tail of a key's order list is its nearest holder.

use std::collections::HashMap;
use tracing::trace;

/// Per-key registration index owned by a [`super::ContextStack`].
///
/// Three maps are kept in lockstep for every key present:
/// - `sequences`: last issued slot (starts at -1, removed once it drops below 0)
/// - `orders`: activation indices in registration order
/// - `lookups`: activation index -> its position in `orders`
///
/// A key is either present in all three maps with a non-empty order list or
/// absent from all of them.
#[derive(Debug, Default, Clone)]
pub struct CheckpointIndex {
    sequences: HashMap<String, isize>,
    orders: HashMap<String, Vec<usize>>,
    lookups: HashMap<String, HashMap<usize, usize>>,
}

impl CheckpointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the context at `activation_index` publishes `key`.
    ///
    /// Registering the same pair twice records it twice; each
    /// [`withdraw`](Self::withdraw) removes one occurrence.
    pub fn register(&mut self, key: &str, activation_index: usize) {
        let sequence = self.sequences.entry(key.to_string()).or_insert(-1);
        *sequence += 1;
        let slot = *sequence as usize;

        self.lookups
            .entry(key.to_string())
            .or_default()
            .insert(activation_index, slot);
        self.orders
            .entry(key.to_string())
            .or_default()
            .push(activation_index);

        trace!(key, activation_index, slot, "checkpoint registered");
    }

    /// Remove one registration of `key` for `activation_index`.
    ///
    /// Withdrawing a pair that was never registered is a no-op.
    pub fn withdraw(&mut self, key: &str, activation_index: usize) {
        let Some(order) = self.orders.get_mut(key) else {
            return;
        };

        let slot = self
            .lookups
            .get_mut(key)
            .and_then(|lookup| lookup.remove(&activation_index))
            .filter(|&slot| order.get(slot) == Some(&activation_index))
            .or_else(|| order.iter().position(|&index| index == activation_index));

        let Some(slot) = slot else {
            trace!(key, activation_index, "withdraw without registration ignored");
            return;
        };

        order.remove(slot);
        if let Some(sequence) = self.sequences.get_mut(key) {
            *sequence -= 1;
        }

        if order.is_empty() {
            self.orders.remove(key);
            self.lookups.remove(key);
            self.sequences.remove(key);
            trace!(key, activation_index, "last checkpoint withdrawn");
            return;
        }

        if let Some(lookup) = self.lookups.get_mut(key) {
            // Out-of-order withdrawal: positions after the hole move down.
            if slot < order.len() {
                for position in lookup.values_mut() {
                    if *position > slot {
                        *position -= 1;
                    }
                }
            }
            // Duplicate registrations: point the lookup at the latest survivor.
            if order.len() > lookup.len() && !lookup.contains_key(&activation_index) {
                if let Some(last) = order.iter().rposition(|&index| index == activation_index) {
                    lookup.insert(activation_index, last);
                }
            }
        }

        trace!(key, activation_index, slot, "checkpoint withdrawn");
    }

    /// Activation index of the most recent registration for `key`.
    pub fn nearest(&self, key: &str) -> Option<usize> {
        self.orders.get(key).and_then(|order| order.last().copied())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.orders.contains_key(key)
    }

    /// Activation indices registered for `key`, oldest first.
    pub fn registrations(&self, key: &str) -> &[usize] {
        self.orders.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of keys with at least one registration.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
