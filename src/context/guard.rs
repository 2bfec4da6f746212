//! Scoped activation: a context stays active for the lifetime of its guard.

use crate::context::Context;
use std::ops::Deref;

/// Deactivates the wrapped context when dropped, including during unwinding.
#[must_use = "the context is deactivated as soon as the guard is dropped"]
pub struct ActiveGuard<V: Clone + Send + 'static> {
    context: Context<V>,
}

impl<V: Clone + Send + 'static> ActiveGuard<V> {
    pub(crate) fn new(context: Context<V>) -> Self {
        ActiveGuard { context }
    }

    pub fn context(&self) -> &Context<V> {
        &self.context
    }
}

impl<V: Clone + Send + 'static> Deref for ActiveGuard<V> {
    type Target = Context<V>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl<V: Clone + Send + 'static> Drop for ActiveGuard<V> {
    fn drop(&mut self) {
        self.context.deactivate();
    }
}
