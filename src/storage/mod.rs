//! Storage boundary: resolves the [`ContextStack`] of the calling execution
//! unit.
//!
//! Backends differ only in how they isolate stacks:
//! - [`LocalStorage`]: one stack per storage instance
//! - [`ThreadLocalStorage`]: one stack per storage instance and OS thread
//! - [`TaskLocalStorage`]: one stack per storage instance and tokio task scope

mod local;
mod task_local;
mod thread_local;

pub use local::LocalStorage;
pub use task_local::TaskLocalStorage;
pub use thread_local::ThreadLocalStorage;

use crate::context::{Binding, Context};
use crate::error::ApiError;
use crate::stack::ContextStack;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stack handle handed out by a storage backend.
///
/// The mutex makes the handle `Send` for async tasks; a stack is only ever
/// used by the execution unit it belongs to, so the lock is uncontended.
pub type SharedStack<V> = Arc<Mutex<ContextStack<V>>>;

pub(crate) fn new_shared_stack<V>() -> SharedStack<V> {
    Arc::new(Mutex::new(ContextStack::new()))
}

/// Supplies one isolated [`ContextStack`] per execution unit.
pub trait Storage<V>: Send + Sync {
    /// Stack of the calling execution unit, created on first use.
    fn get_state(&self) -> SharedStack<V>;

    /// Install `state` as the calling execution unit's stack.
    fn set_state(&self, state: SharedStack<V>);

    fn kind(&self) -> BackendKind;

    fn push_context(&self, context: Context<V>) -> usize {
        self.get_state().lock().push(context)
    }

    fn pop_context(&self, index: Option<usize>) -> Option<Context<V>> {
        self.get_state().lock().pop(index)
    }

    fn last_context(&self) -> Option<Context<V>> {
        self.get_state().lock().top().cloned()
    }

    fn add_checkpoint(&self, key: &str, activation_index: usize) {
        self.get_state()
            .lock()
            .checkpoints_mut()
            .register(key, activation_index)
    }

    fn remove_checkpoint(&self, key: &str, activation_index: usize) {
        self.get_state()
            .lock()
            .checkpoints_mut()
            .withdraw(key, activation_index)
    }

    fn nearest_checkpoint(&self, key: &str) -> Option<Context<V>> {
        self.get_state().lock().nearest_checkpoint(key).cloned()
    }

    fn nearest_checkpoint_index(&self, key: &str) -> Option<usize> {
        self.get_state().lock().checkpoints().nearest(key)
    }

    /// Bind a context family to this storage.
    fn bind(self) -> Binding<V>
    where
        Self: Sized + 'static,
        V: Clone + Send + 'static,
    {
        Binding::new(Arc::new(self))
    }
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Local,
    #[default]
    Thread,
    Task,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Local, BackendKind::Thread, BackendKind::Task];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Thread => "thread",
            BackendKind::Task => "task",
        }
    }

    /// One-line description for listings.
    pub fn describe(self) -> &'static str {
        match self {
            BackendKind::Local => "single stack owned by the storage instance",
            BackendKind::Thread => "one stack per OS thread",
            BackendKind::Task => "one stack per tokio task scope, thread fallback outside",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "thread" | "thread_local" => Ok(BackendKind::Thread),
            "task" | "task_local" => Ok(BackendKind::Task),
            other => Err(ApiError::InvalidBackend(other.to_string())),
        }
    }
}

/// Build a fresh storage of the given kind.
pub fn build<V: Send + 'static>(kind: BackendKind) -> Arc<dyn Storage<V>> {
    match kind {
        BackendKind::Local => Arc::new(LocalStorage::new()),
        BackendKind::Thread => Arc::new(ThreadLocalStorage::new()),
        BackendKind::Task => Arc::new(TaskLocalStorage::new()),
    }
}

/// Per-execution-unit registry of stacks, keyed by storage id.
///
/// Stacks are type-erased so one registry can serve storages of any value type.
pub(crate) type StackRegistry = HashMap<u64, Box<dyn Any + Send>>;

static STORAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_storage_id() -> u64 {
    STORAGE_COUNTER.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn resolve_in<V: Send + 'static>(
    registry: &mut StackRegistry,
    storage_id: u64,
) -> SharedStack<V> {
    if let Some(state) = registry
        .get(&storage_id)
        .and_then(|entry| entry.downcast_ref::<SharedStack<V>>())
    {
        return Arc::clone(state);
    }
    let state = new_shared_stack::<V>();
    registry.insert(storage_id, Box::new(Arc::clone(&state)));
    state
}
