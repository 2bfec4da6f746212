//! Thread-local backend: every OS thread sees its own stack.

use scopestack::{Binding, Storage, ThreadLocalStorage};
use std::thread;

#[test]
fn test_thread_counters_are_isolated() {
    let contexts: Binding<u32> = ThreadLocalStorage::new().bind();
    let per_thread_limit = 1000;
    let threads_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
        .clamp(8, 64);

    contexts.scope(|_| {
        let mut handles = Vec::new();
        for _ in 0..threads_count {
            let counter = contexts.get_checkpoint_value_or("counter", 0);
            let remote = contexts.clone();
            handles.push(thread::spawn(move || {
                remote.scope(|_| {
                    for _ in 0..per_thread_limit {
                        let value = remote.get_checkpoint_value_or("counter", 0);
                        remote.set_checkpoint_value("counter", value + 1).unwrap();
                    }
                    remote.get_checkpoint_value("counter")
                })
            }));
            contexts.set_checkpoint_value("counter", counter + 1).unwrap();
        }

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(per_thread_limit));
        }
        assert_eq!(
            contexts.get_checkpoint_value("counter"),
            Some(threads_count as u32)
        );
    });
}

#[test]
fn test_thread_stack_created_lazily() {
    let storage = ThreadLocalStorage::<u32>::new();
    let depth = thread::spawn(move || {
        let state = storage.get_state();
        let depth = state.lock().len();
        depth
    })
    .join()
    .unwrap();
    assert_eq!(depth, 0);
}
