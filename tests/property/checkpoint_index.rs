//! Checkpoint index consistency under arbitrary register/withdraw sequences.

use proptest::prelude::*;
use scopestack::CheckpointIndex;

proptest! {
    #[test]
    fn test_nearest_is_latest_live_registration(
        ops in prop::collection::vec((any::<bool>(), 0usize..16), 1..128)
    ) {
        let mut index = CheckpointIndex::new();
        let mut live: Vec<usize> = Vec::new();

        for (register, activation) in ops {
            if register {
                if !live.contains(&activation) {
                    index.register("key", activation);
                    live.push(activation);
                }
            } else {
                index.withdraw("key", activation);
                live.retain(|a| *a != activation);
            }

            prop_assert_eq!(index.nearest("key"), live.last().copied());
            prop_assert_eq!(index.contains_key("key"), !live.is_empty());
            prop_assert_eq!(index.registrations("key"), live.as_slice());
        }
    }

    #[test]
    fn test_keys_are_independent(
        activations in prop::collection::vec(0usize..8, 1..32)
    ) {
        let mut index = CheckpointIndex::new();
        for (i, activation) in activations.iter().enumerate() {
            let key = if i % 2 == 0 { "even" } else { "odd" };
            index.register(key, *activation);
        }
        for (i, activation) in activations.iter().enumerate().rev() {
            let key = if i % 2 == 0 { "even" } else { "odd" };
            prop_assert_eq!(index.nearest(key), Some(*activation));
            index.withdraw(key, *activation);
        }
        prop_assert!(index.is_empty());
    }
}
