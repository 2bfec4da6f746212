//! Task-local storage: one stack per storage instance and tokio task scope.
//!
//! Stacks live in a registry installed by [`TaskLocalStorage::scope`] (or
//! [`TaskLocalStorage::sync_scope`]). Code running outside such a scope falls
//! back to the calling thread's stack, so a storage is always usable.

use super::thread_local::{release_thread_state, ThreadLocalStorage};
use super::{next_storage_id, resolve_in, BackendKind, SharedStack, StackRegistry, Storage};
use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;

tokio::task_local! {
    static TASK_STACKS: RefCell<StackRegistry>;
}

/// Storage giving every task scope its own lazily created stack.
pub struct TaskLocalStorage<V> {
    id: u64,
    _values: PhantomData<fn() -> V>,
}

impl<V> Default for TaskLocalStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TaskLocalStorage<V> {
    pub fn new() -> Self {
        TaskLocalStorage {
            id: next_storage_id(),
            _values: PhantomData,
        }
    }
}

impl TaskLocalStorage<()> {
    /// Run `future` with a fresh, empty stack registry.
    ///
    /// Every task-local storage seen from inside `future` starts with an empty
    /// stack. Nested scopes shadow the enclosing registry.
    pub async fn scope<F: Future>(future: F) -> F::Output {
        TASK_STACKS
            .scope(RefCell::new(StackRegistry::new()), future)
            .await
    }

    /// Synchronous counterpart of [`scope`](Self::scope).
    pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
        TASK_STACKS.sync_scope(RefCell::new(StackRegistry::new()), f)
    }

    /// Whether the caller runs inside a task scope.
    pub fn in_scope() -> bool {
        TASK_STACKS.try_with(|_| ()).is_ok()
    }
}

impl<V: Send + 'static> Storage<V> for TaskLocalStorage<V> {
    fn get_state(&self) -> SharedStack<V> {
        TASK_STACKS
            .try_with(|stacks| resolve_in(&mut stacks.borrow_mut(), self.id))
            .unwrap_or_else(|_| ThreadLocalStorage::thread_state(self.id))
    }

    fn set_state(&self, state: SharedStack<V>) {
        let installed = TASK_STACKS.try_with(|stacks| {
            stacks.borrow_mut().insert(self.id, Box::new(state.clone()));
        });
        if installed.is_err() {
            ThreadLocalStorage::set_thread_state(self.id, state);
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Task
    }
}

impl<V> Drop for TaskLocalStorage<V> {
    fn drop(&mut self) {
        // Only the thread fallback entry is reachable here; task registries
        // are dropped with their scope.
        release_thread_state(self.id);
    }
}
