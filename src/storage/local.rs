//! Local storage: a single stack owned by the storage instance.

use super::{new_shared_stack, BackendKind, SharedStack, Storage};
use parking_lot::Mutex;
use std::sync::Arc;

/// Storage whose stack is shared by every caller of this instance.
///
/// No isolation is provided; use it when one execution unit owns the storage,
/// or as a building block for custom backends.
pub struct LocalStorage<V> {
    state: Mutex<SharedStack<V>>,
}

impl<V> Default for LocalStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LocalStorage<V> {
    pub fn new() -> Self {
        LocalStorage {
            state: Mutex::new(new_shared_stack()),
        }
    }
}

impl<V: Send> Storage<V> for LocalStorage<V> {
    fn get_state(&self) -> SharedStack<V> {
        Arc::clone(&self.state.lock())
    }

    fn set_state(&self, state: SharedStack<V>) {
        *self.state.lock() = state;
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
