//! Shared test utilities for integration tests
//!
//! Tests that read or write process environment variables serialize on one
//! mutex and restore what they touched.

use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const TRACKED_VARS: [&str; 5] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "SCOPESTACK_ENV",
    "SCOPESTACK__STORAGE__BACKEND",
    "SCOPESTACK__LOGGING__LEVEL",
];

/// Lock the environment for the duration of a test.
pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Environment variable state to restore after test
struct EnvState {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            saved: TRACKED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.saved {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `test_fn` with HOME and XDG_CONFIG_HOME pointing into a fresh temp dir.
///
/// Scopestack variables are cleared before the test runs and every tracked
/// variable is restored afterwards, even if `test_fn` panics.
pub fn with_xdg_env<F, R>(test_fn: F) -> R
where
    F: FnOnce(&TempDir) -> R,
{
    let _guard = env_lock();
    let state = EnvState::capture();

    let test_dir = TempDir::new().unwrap();
    std::env::set_var("HOME", test_dir.path());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().join(".config"));
    for name in &TRACKED_VARS[2..] {
        std::env::remove_var(name);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| test_fn(&test_dir)));
    state.restore();

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
