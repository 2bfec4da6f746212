//! Push/pop discipline over arbitrary nesting.

use proptest::prelude::*;
use scopestack::{Binding, LocalStorage, Storage};

#[derive(Debug, Clone)]
enum Op {
    Enter,
    Exit,
    Set(u8, i32),
    Pop(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Enter),
        2 => Just(Op::Exit),
        3 => (0u8..4, any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        1 => (0u8..4).prop_map(Op::Pop),
    ]
}

/// Reference model: a stack of frames, each holding its own key/value layer.
fn model_lookup(frames: &[Vec<(String, i32)>], key: &str) -> Option<i32> {
    frames
        .iter()
        .rev()
        .find_map(|f| f.iter().rev().find(|(k, _)| k == key).map(|(_, v)| *v))
}

proptest! {
    #[test]
    fn test_deactivate_returns_top(depth in 1usize..32) {
        let contexts: Binding<i32> = LocalStorage::new().bind();
        let state = contexts.storage().get_state();
        let opened: Vec<_> = (0..depth).map(|_| contexts.context()).collect();

        for (i, ctx) in opened.iter().enumerate() {
            ctx.activate();
            prop_assert_eq!(ctx.index(), Ok(i));
            prop_assert_eq!(state.lock().sequence(), i as isize);
        }

        for ctx in opened.iter().rev() {
            let current = contexts.current();
            prop_assert_eq!(current.as_ref(), Some(ctx));
            ctx.deactivate();
            prop_assert!(!ctx.is_active());
        }

        prop_assert!(state.lock().is_empty());
        prop_assert_eq!(state.lock().sequence(), -1);
    }

    #[test]
    fn test_lookup_matches_model(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let contexts: Binding<i32> = LocalStorage::new().bind();
        let mut active = Vec::new();
        let mut frames: Vec<Vec<(String, i32)>> = Vec::new();

        for op in ops {
            match op {
                Op::Enter => {
                    let ctx = contexts.context();
                    ctx.activate();
                    active.push(ctx);
                    frames.push(Vec::new());
                }
                Op::Exit => {
                    if let Some(ctx) = active.pop() {
                        ctx.deactivate();
                        frames.pop();
                    }
                }
                Op::Set(k, v) => {
                    let key = format!("k{}", k);
                    let result = contexts.set_checkpoint_value(&key, v);
                    match frames.last_mut() {
                        Some(frame) => {
                            prop_assert!(result.is_ok());
                            frame.retain(|(existing, _)| *existing != key);
                            frame.push((key, v));
                        }
                        None => prop_assert!(result.is_err()),
                    }
                }
                Op::Pop(k) => {
                    let key = format!("k{}", k);
                    let expected = model_lookup(&frames, &key);
                    if expected.is_some() {
                        for frame in frames.iter_mut().rev() {
                            if let Some(pos) = frame.iter().position(|(existing, _)| *existing == key) {
                                frame.remove(pos);
                                break;
                            }
                        }
                    }
                    prop_assert_eq!(contexts.pop_checkpoint_value(&key), expected);
                }
            }

            for k in 0..4u8 {
                let key = format!("k{}", k);
                prop_assert_eq!(contexts.get_checkpoint_value(&key), model_lookup(&frames, &key));
            }
        }

        while let Some(ctx) = active.pop() {
            ctx.deactivate();
        }
        prop_assert!(contexts.storage().get_state().lock().checkpoints().is_empty());
    }
}
