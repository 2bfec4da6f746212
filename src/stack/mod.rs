//! Context Stack
//!
//! The LIFO sequence of active contexts for one execution unit, together with
//! the [`CheckpointIndex`] that resolves checkpoint keys to their nearest
//! holder. Methods take `&mut self`; isolation between execution units is the
//! job of the [`crate::storage`] backends, not of this type.

pub mod checkpoint;

pub use checkpoint::CheckpointIndex;

use crate::context::Context;
use std::fmt;
use tracing::trace;

/// Active contexts in activation order plus the activation sequence counter.
pub struct ContextStack<V> {
    /// Last issued activation index; -1 when nothing has been pushed.
    sequence: isize,
    contexts: Vec<Context<V>>,
    checkpoints: CheckpointIndex,
}

impl<V> Default for ContextStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for ContextStack<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStack")
            .field("sequence", &self.sequence)
            .field("contexts", &self.contexts)
            .field("checkpoints", &self.checkpoints)
            .finish()
    }
}

impl<V> ContextStack<V> {
    pub fn new() -> Self {
        ContextStack {
            sequence: -1,
            contexts: Vec::new(),
            checkpoints: CheckpointIndex::new(),
        }
    }

    /// Push a context and return its activation index.
    pub fn push(&mut self, context: Context<V>) -> usize {
        self.sequence += 1;
        trace!(context = %context.id(), index = self.sequence, "context pushed");
        self.contexts.push(context);
        self.sequence as usize
    }

    /// Remove the context at `index` (the tail when `None`).
    ///
    /// The sequence counter is decremented on every call, even when nothing is
    /// removed, and never drops below -1. Popping a non-tail index therefore
    /// leaves `sequence` out of step with the stack depth.
    pub fn pop(&mut self, index: Option<usize>) -> Option<Context<V>> {
        self.sequence = (self.sequence - 1).max(-1);
        let index = match index {
            Some(index) => index,
            None => self.contexts.len().checked_sub(1)?,
        };
        if index >= self.contexts.len() {
            trace!(index, depth = self.contexts.len(), "pop out of range");
            return None;
        }
        let context = self.contexts.remove(index);
        trace!(context = %context.id(), index, "context popped");
        Some(context)
    }

    /// Most recently pushed context.
    pub fn top(&self) -> Option<&Context<V>> {
        self.contexts.last()
    }

    pub fn get(&self, index: usize) -> Option<&Context<V>> {
        self.contexts.get(index)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Last issued activation index (-1 before the first push).
    pub fn sequence(&self) -> isize {
        self.sequence
    }

    pub fn checkpoints(&self) -> &CheckpointIndex {
        &self.checkpoints
    }

    pub fn checkpoints_mut(&mut self) -> &mut CheckpointIndex {
        &mut self.checkpoints
    }

    /// The nearest active context holding `key`.
    pub fn nearest_checkpoint(&self, key: &str) -> Option<&Context<V>> {
        self.checkpoints
            .nearest(key)
            .and_then(|index| self.contexts.get(index))
    }

    /// Withdraw the nearest registration of `key`.
    ///
    /// Returns the activation index that was withdrawn and the context found at
    /// that index, if any.
    pub fn withdraw_nearest(&mut self, key: &str) -> Option<(usize, Option<Context<V>>)> {
        let index = self.checkpoints.nearest(key)?;
        self.checkpoints.withdraw(key, index);
        Some((index, self.contexts.get(index).cloned()))
    }
}
