//! Property-based tests using proptest
//!
//! Random operation sequences against the adaptable priority queue, checked
//! after every step against a plain map of live entries.

use std::collections::HashMap;

use flash_core::{AdaptablePriorityQueue, Handle, QueueError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(i32),
    RemoveMin,
    UpdateKey(usize, i32),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-100i32..100).prop_map(Op::Add),
        1 => Just(Op::RemoveMin),
        2 => (any::<usize>(), -100i32..100).prop_map(|(i, k)| Op::UpdateKey(i, k)),
        1 => any::<usize>().prop_map(Op::Remove),
    ]
}

/// Apply `ops`, checking the heap invariant and that every live handle still
/// resolves to its own entry.
fn run_ops(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut queue = AdaptablePriorityQueue::new();
    // value -> (handle, key) for live entries
    let mut live: HashMap<u32, (Handle, i32)> = HashMap::new();
    let mut dead: Vec<Handle> = Vec::new();
    let mut next_value = 0u32;

    for op in ops {
        match op {
            Op::Add(key) => {
                let handle = queue.add(key, next_value);
                live.insert(next_value, (handle, key));
                next_value += 1;
            }
            Op::RemoveMin => {
                let expected = live.values().map(|(_, key)| *key).min();
                match queue.remove_min() {
                    Some((key, value)) => {
                        prop_assert_eq!(Some(key), expected);
                        let (handle, _) = live.remove(&value).unwrap();
                        dead.push(handle);
                    }
                    None => prop_assert!(live.is_empty()),
                }
            }
            Op::UpdateKey(pick, key) => {
                if live.is_empty() {
                    continue;
                }
                let mut values: Vec<u32> = live.keys().copied().collect();
                values.sort_unstable();
                let value = values[pick % values.len()];
                let handle = live[&value].0;
                prop_assert_eq!(queue.update_key(handle, key).copied(), Ok(value));
                live.insert(value, (handle, key));
            }
            Op::Remove(pick) => {
                if live.is_empty() {
                    continue;
                }
                let mut values: Vec<u32> = live.keys().copied().collect();
                values.sort_unstable();
                let value = values[pick % values.len()];
                let (handle, key) = live.remove(&value).unwrap();
                prop_assert_eq!(queue.remove(handle), Ok((key, value)));
                dead.push(handle);
            }
        }

        prop_assert!(queue.is_heap_ordered());
        prop_assert_eq!(queue.len(), live.len());
        for (value, (handle, key)) in &live {
            prop_assert_eq!(queue.get(*handle), Ok(value));
            prop_assert_eq!(queue.get_key(*handle), Ok(key));
        }
        for handle in &dead {
            prop_assert_eq!(queue.get(*handle), Err(QueueError::InvalidHandle));
        }
        if let Some(expected) = live.values().map(|(_, key)| *key).min() {
            let (_, min_key) = queue.min().unwrap();
            prop_assert_eq!(*min_key, expected);
        } else {
            prop_assert_eq!(queue.min(), Err(QueueError::Empty));
        }
    }

    Ok(())
}

/// Draining the queue yields keys in non-decreasing order
fn run_drain(keys: Vec<i32>) -> Result<(), TestCaseError> {
    let mut queue = AdaptablePriorityQueue::new();
    for (i, key) in keys.iter().enumerate() {
        queue.add(*key, i);
    }

    let mut drained = Vec::new();
    while let Some((key, _)) = queue.remove_min() {
        drained.push(key);
    }

    let mut sorted = keys;
    sorted.sort();
    prop_assert_eq!(drained, sorted);
    Ok(())
}

proptest! {
    #[test]
    fn test_random_operations_keep_invariants(ops in prop::collection::vec(op_strategy(), 0..200)) {
        run_ops(ops)?;
    }

    #[test]
    fn test_drain_is_sorted(keys in prop::collection::vec(-1000i32..1000, 0..200)) {
        run_drain(keys)?;
    }
}
