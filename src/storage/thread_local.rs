//! Thread-local storage: one stack per storage instance and OS thread.

use super::{next_storage_id, resolve_in, BackendKind, SharedStack, StackRegistry, Storage};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static THREAD_STACKS: RefCell<StackRegistry> = RefCell::new(StackRegistry::new());
}

/// Storage giving every OS thread its own lazily created stack.
///
/// Several instances can coexist; each keeps separate stacks on every thread.
pub struct ThreadLocalStorage<V> {
    id: u64,
    _values: PhantomData<fn() -> V>,
}

impl<V> Default for ThreadLocalStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ThreadLocalStorage<V> {
    pub fn new() -> Self {
        ThreadLocalStorage {
            id: next_storage_id(),
            _values: PhantomData,
        }
    }
}

impl<V: Send + 'static> ThreadLocalStorage<V> {
    pub(crate) fn thread_state(storage_id: u64) -> SharedStack<V> {
        THREAD_STACKS.with(|stacks| resolve_in(&mut stacks.borrow_mut(), storage_id))
    }

    pub(crate) fn set_thread_state(storage_id: u64, state: SharedStack<V>) {
        THREAD_STACKS.with(|stacks| {
            stacks.borrow_mut().insert(storage_id, Box::new(state));
        });
    }
}

impl<V: Send + 'static> Storage<V> for ThreadLocalStorage<V> {
    fn get_state(&self) -> SharedStack<V> {
        Self::thread_state(self.id)
    }

    fn set_state(&self, state: SharedStack<V>) {
        Self::set_thread_state(self.id, state);
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Thread
    }
}

impl<V> Drop for ThreadLocalStorage<V> {
    fn drop(&mut self) {
        // Other threads release their entry when they exit.
        release_thread_state(self.id);
    }
}

/// Remove the calling thread's stack for `storage_id`, if any.
pub(crate) fn release_thread_state(storage_id: u64) {
    let removed = THREAD_STACKS
        .try_with(|stacks| {
            stacks
                .try_borrow_mut()
                .ok()
                .and_then(|mut stacks| stacks.remove(&storage_id))
        })
        .ok()
        .flatten();
    drop(removed);
}
