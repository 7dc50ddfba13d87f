//! Heap slot wrapper
//!
//! An [`Element`] binds a priority key, a payload, and the element's current
//! position in the owning heap's backing array.

use std::cmp::Ordering;

/// A single entry stored by [`AdaptablePriorityQueue`](super::AdaptablePriorityQueue).
///
/// `index` always equals the element's position in the heap array; only the
/// queue writes it. Equality and ordering look at the key alone.
#[derive(Debug, Clone)]
pub struct Element<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) index: usize,
}

impl<K, V> Element<K, V> {
    pub(crate) fn new(key: K, value: V, index: usize) -> Self {
        Self { key, value, index }
    }

    /// The priority key
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The payload
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Current position in the heap array
    pub fn index(&self) -> usize {
        self.index
    }

    /// Consume the element, returning `(key, value)`
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: PartialEq, V> PartialEq for Element<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V> Eq for Element<K, V> {}

impl<K: PartialOrd, V> PartialOrd for Element<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

impl<K: Ord, V> Ord for Element<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
