//! Binding: a family of contexts tied to one [`Storage`].
//!
//! Everything that operates on "the current stack" rather than on a single
//! context lives here, resolved through the bound storage.

use crate::config::StorageConfig;
use crate::context::Context;
use crate::error::ContextError;
use crate::storage::{self, Storage};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Storage-bound handle for creating contexts and reading or writing
/// checkpoint values on the calling execution unit's stack.
pub struct Binding<V = crate::context::Value> {
    storage: Arc<dyn Storage<V>>,
}

impl<V> Clone for Binding<V> {
    fn clone(&self) -> Self {
        Binding {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<V> fmt::Debug for Binding<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("storage", &self.storage.kind())
            .finish()
    }
}

impl<V: Clone + Send + 'static> Binding<V> {
    pub fn new(storage: Arc<dyn Storage<V>>) -> Self {
        Binding { storage }
    }

    /// Bind to a freshly built backend of the configured kind.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(storage::build(config.backend))
    }

    pub fn storage(&self) -> &Arc<dyn Storage<V>> {
        &self.storage
    }

    /// New inert context bound to this binding's storage.
    pub fn context(&self) -> Context<V> {
        Context::new(Arc::clone(&self.storage))
    }

    /// Run `f` inside a fresh active context.
    pub fn scope<R>(&self, f: impl FnOnce(&Context<V>) -> R) -> R {
        let context = self.context();
        let guard = context.enter();
        f(&guard)
    }

    /// Innermost active context.
    pub fn current(&self) -> Option<Context<V>> {
        self.storage.last_context()
    }

    /// Nearest active context holding `key`.
    pub fn nearest_checkpoint(&self, key: &str) -> Option<Context<V>> {
        self.storage.nearest_checkpoint(key)
    }

    pub fn get_checkpoint_value(&self, key: &str) -> Option<V> {
        self.nearest_checkpoint(key)?.own_checkpoint_value(key)
    }

    pub fn get_checkpoint_value_or(&self, key: &str, default: V) -> V {
        self.get_checkpoint_value(key).unwrap_or(default)
    }

    /// Publish `value` under `key` on the innermost active context.
    pub fn set_checkpoint_value(
        &self,
        key: impl Into<String>,
        value: V,
    ) -> Result<(), ContextError> {
        let context = self.current().ok_or(ContextError::NoActiveContext)?;
        context.publish(key.into(), value);
        Ok(())
    }

    /// Remove the nearest registration of `key` and return the holder's value.
    pub fn pop_checkpoint_value(&self, key: &str) -> Option<V> {
        let (index, holder) = self.storage.get_state().lock().withdraw_nearest(key)?;
        trace!(key, index, "checkpoint value popped");
        holder?.take_checkpoint_value(key)
    }

    pub fn pop_checkpoint_value_or(&self, key: &str, default: V) -> V {
        self.pop_checkpoint_value(key).unwrap_or(default)
    }

    /// Withdraw every registration of `key` on the current stack, innermost first.
    pub fn reset_checkpoint_value(&self, key: &str) {
        while self.storage.nearest_checkpoint_index(key).is_some() {
            self.pop_checkpoint_value(key);
        }
    }
}
