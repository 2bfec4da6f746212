//! Context domain: the scoped entity, its activation protocol, and the
//! storage-bound [`Binding`] that provides stack-wide operations.
//!
//! A [`Context`] is a cheap, cloneable handle. Clones share the same block
//! data, checkpoint data and activation state; the stack only ever holds such
//! clones, so ownership stays with whoever created the context.

pub mod binding;
pub mod guard;

pub use binding::Binding;
pub use guard::ActiveGuard;

use crate::error::ContextError;
use crate::storage::Storage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Default value type for block and checkpoint data.
pub type Value = serde_json::Value;

static CONTEXT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a context, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        ContextId(CONTEXT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

struct ContextData<V> {
    index: Option<usize>,
    block: HashMap<String, V>,
    checkpoint: HashMap<String, V>,
}

/// A nested scope that can be activated on its storage's current stack.
pub struct Context<V = Value> {
    id: ContextId,
    storage: Arc<dyn Storage<V>>,
    data: Arc<Mutex<ContextData<V>>>,
}

impl<V> Clone for Context<V> {
    fn clone(&self) -> Self {
        Context {
            id: self.id,
            storage: Arc::clone(&self.storage),
            data: Arc::clone(&self.data),
        }
    }
}

impl<V> PartialEq for Context<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for Context<V> {}

impl<V> fmt::Debug for Context<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.data.try_lock().map(|data| data.index);
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("storage", &self.storage.kind())
            .field("index", &index)
            .finish()
    }
}

impl<V> Context<V> {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn storage(&self) -> &Arc<dyn Storage<V>> {
        &self.storage
    }

    /// Activation index on the current stack.
    pub fn index(&self) -> Result<usize, ContextError> {
        self.data.lock().index.ok_or(ContextError::NotActive(self.id))
    }

    pub fn is_active(&self) -> bool {
        self.data.lock().index.is_some()
    }
}

impl<V: Clone + Send + 'static> Context<V> {
    /// Create an inert context bound to `storage`.
    pub fn new(storage: Arc<dyn Storage<V>>) -> Self {
        Context {
            id: ContextId::next(),
            storage,
            data: Arc::new(Mutex::new(ContextData {
                index: None,
                block: HashMap::new(),
                checkpoint: HashMap::new(),
            })),
        }
    }

    /// Push this context onto the current stack and publish its checkpoint keys.
    ///
    /// Does nothing when the context is already active.
    pub fn activate(&self) -> &Self {
        let keys: Vec<String> = {
            let data = self.data.lock();
            if data.index.is_some() {
                return self;
            }
            data.checkpoint.keys().cloned().collect()
        };

        let state = self.storage.get_state();
        let index = {
            let mut stack = state.lock();
            let index = stack.push(self.clone());
            for key in &keys {
                stack.checkpoints_mut().register(key, index);
            }
            index
        };

        self.data.lock().index = Some(index);
        debug!(context = %self.id, index, published = keys.len(), "context activated");
        self
    }

    /// Withdraw this context's checkpoint keys and pop it from the current stack.
    ///
    /// Does nothing when the context is not active.
    pub fn deactivate(&self) {
        let (index, keys): (usize, Vec<String>) = {
            let data = self.data.lock();
            let Some(index) = data.index else {
                return;
            };
            (index, data.checkpoint.keys().cloned().collect())
        };

        let state = self.storage.get_state();
        {
            let mut stack = state.lock();
            for key in &keys {
                stack.checkpoints_mut().withdraw(key, index);
            }
            stack.pop(Some(index));
        }

        self.data.lock().index = None;
        debug!(context = %self.id, index, "context deactivated");
    }

    /// Activate and return a guard that deactivates when dropped.
    pub fn enter(&self) -> ActiveGuard<V> {
        self.activate();
        ActiveGuard::new(self.clone())
    }

    pub fn get_block_value(&self, key: &str) -> Option<V> {
        self.data.lock().block.get(key).cloned()
    }

    pub fn get_block_value_or(&self, key: &str, default: V) -> V {
        self.get_block_value(key).unwrap_or(default)
    }

    pub fn set_block_value(&self, key: impl Into<String>, value: V) {
        self.data.lock().block.insert(key.into(), value);
    }

    pub fn pop_block_value(&self, key: &str) -> Option<V> {
        self.data.lock().block.remove(key)
    }

    pub fn pop_block_value_or(&self, key: &str, default: V) -> V {
        self.pop_block_value(key).unwrap_or(default)
    }

    /// Snapshot of this context's block data.
    pub fn block_data(&self) -> HashMap<String, V> {
        self.data.lock().block.clone()
    }

    /// Snapshot of the checkpoint values this context owns.
    pub fn checkpoint_data(&self) -> HashMap<String, V> {
        self.data.lock().checkpoint.clone()
    }

    /// The checkpoint value this context owns for `key`, ignoring other contexts.
    pub fn own_checkpoint_value(&self, key: &str) -> Option<V> {
        self.data.lock().checkpoint.get(key).cloned()
    }

    /// Store a checkpoint value on this context directly.
    ///
    /// Typically used before activation so the key is published when the
    /// context is entered. On an active context a newly held key is registered
    /// at this context's activation index right away.
    pub fn seed_checkpoint_value(&self, key: impl Into<String>, value: V) {
        self.publish(key.into(), value);
    }

    pub(crate) fn publish(&self, key: String, value: V) {
        let (index, newly_held) = {
            let mut data = self.data.lock();
            let newly_held = !data.checkpoint.contains_key(&key);
            data.checkpoint.insert(key.clone(), value);
            (data.index, newly_held)
        };

        if let (Some(index), true) = (index, newly_held) {
            self.storage.add_checkpoint(&key, index);
        }
    }

    pub(crate) fn take_checkpoint_value(&self, key: &str) -> Option<V> {
        self.data.lock().checkpoint.remove(key)
    }
}
