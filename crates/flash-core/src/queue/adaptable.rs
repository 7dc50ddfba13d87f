//! Adaptable Priority Queue
//!
//! A binary min-heap with stable handles. Besides `add` / `min` /
//! `remove_min`, any element can be re-keyed or removed through the handle
//! returned when it was added.
//!
//! # Layout
//!
//! Elements live in an arena of slots and never move once inserted. The heap
//! array holds slot ids, and each [`Element`] records its own position in that
//! array. Every swap rewrites the `index` of both participants, so a handle
//! (slot id + generation) always resolves to the element's current position,
//! no matter how many mutations happened since it was issued.
//!
//! Removing an element wipes its slot and bumps the slot generation, which is
//! how stale handles are told apart from live ones when the slot is reused.
//!
//! # Time Complexity
//!
//! | Operation           | Complexity |
//! |---------------------|------------|
//! | `add`               | O(log n)   |
//! | `min`               | O(1)       |
//! | `remove_min`        | O(log n)   |
//! | `update_key`        | O(log n)   |
//! | `remove`            | O(log n)   |
//! | `get_key` / `get`   | O(1)       |
//! | `find_by_value`     | O(n)       |
//!
//! Value lookup is a linear scan. Queues hold one reviewer's cards, so this is
//! a known scaling limit rather than a correctness problem.
//!
//! # Example
//!
//! ```rust
//! use flash_core::queue::AdaptablePriorityQueue;
//!
//! let mut queue = AdaptablePriorityQueue::new();
//! queue.add(5, "five");
//! let three = queue.add(3, "three");
//! queue.add(8, "eight");
//!
//! queue.update_key(three, 9).unwrap();
//! assert_eq!(queue.min().unwrap(), (&"five", &5));
//! assert_eq!(queue.remove(three).unwrap(), (9, "three"));
//! assert!(queue.get_key(three).is_err());
//! ```

use super::{Element, QueueError, Result};

/// Opaque reference to an element of an [`AdaptablePriorityQueue`].
///
/// A handle does not own the element. It becomes invalid as soon as the
/// element is removed, and every later use fails with
/// [`QueueError::InvalidHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Slot<K, V> {
    generation: u64,
    /// `None` once the element has been removed
    element: Option<Element<K, V>>,
}

/// Array-backed binary min-heap with handle-based `update_key` and `remove`
#[derive(Debug, Clone)]
pub struct AdaptablePriorityQueue<K, V> {
    slots: Vec<Slot<K, V>>,
    /// Heap array of slot ids; `heap[i]`'s element has `index == i`
    heap: Vec<usize>,
    /// Wiped slots available for reuse
    free: Vec<usize>,
}

impl<K: Ord, V> Default for AdaptablePriorityQueue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> AdaptablePriorityQueue<K, V> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            heap: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Create an empty queue with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            heap: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of elements in the queue
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if the queue holds no elements
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert `value` with priority `key` and return its handle.
    ///
    /// Keys may repeat; no order is promised among equal keys.
    pub fn add(&mut self, key: K, value: V) -> Handle {
        let index = self.heap.len();
        let element = Some(Element::new(key, value, index));

        let handle = match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                entry.element = element;
                Handle {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    element,
                });
                Handle {
                    slot: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };

        self.heap.push(handle.slot);
        self.bubble_up(index);
        handle
    }

    /// The minimum element as `(value, key)`.
    pub fn min(&self) -> Result<(&V, &K)> {
        let slot = *self.heap.first().ok_or(QueueError::Empty)?;
        let element = self.element(slot);
        Ok((&element.value, &element.key))
    }

    /// Remove and return the minimum element as `(key, value)`.
    ///
    /// An empty queue yields `None`; callers that need a value should check
    /// [`len`](Self::len) first.
    pub fn remove_min(&mut self) -> Option<(K, V)> {
        let last = self.heap.len().checked_sub(1)?;
        if last > 0 {
            self.swap(0, last);
        }

        let slot = self.heap.pop()?;
        let element = self.wipe(slot);

        if !self.heap.is_empty() {
            self.bubble_down(0);
        }

        Some(element.into_parts())
    }

    /// Change the key of the element behind `handle` and restore heap order.
    ///
    /// Returns the element's value.
    pub fn update_key(&mut self, handle: Handle, new_key: K) -> Result<&V> {
        let position = self.position(handle)?;
        self.element_mut(handle.slot).key = new_key;
        self.reposition(position);
        debug_assert!(self.is_heap_ordered());
        Ok(&self.element(handle.slot).value)
    }

    /// Remove the element behind `handle`, returning `(key, value)`.
    pub fn remove(&mut self, handle: Handle) -> Result<(K, V)> {
        let position = self.position(handle)?;
        if position == 0 {
            return self.remove_min().ok_or(QueueError::Empty);
        }

        let last = self.heap.len() - 1;
        if position != last {
            self.swap(position, last);
        }

        let slot = self.heap.pop().ok_or(QueueError::Empty)?;
        let element = self.wipe(slot);

        // The element moved in from the back may belong to another subtree,
        // so it can need to travel either way.
        if position < self.heap.len() {
            self.reposition(position);
        }
        debug_assert!(self.is_heap_ordered());

        Ok(element.into_parts())
    }

    /// Current key of the element behind `handle`
    pub fn get_key(&self, handle: Handle) -> Result<&K> {
        let position = self.position(handle)?;
        Ok(&self.element(self.heap[position]).key)
    }

    /// Value of the element behind `handle`
    pub fn get(&self, handle: Handle) -> Result<&V> {
        self.position(handle)?;
        Ok(&self.element(handle.slot).value)
    }

    /// Mutable access to the value behind `handle`.
    ///
    /// The key is not reachable through this reference, so heap order cannot
    /// be disturbed by it.
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut V> {
        self.position(handle)?;
        Ok(&mut self.element_mut(handle.slot).value)
    }

    /// True while `handle` still refers to a stored element
    pub fn contains(&self, handle: Handle) -> bool {
        self.position(handle).is_ok()
    }

    /// Handle of the first element (in heap array order) whose value equals
    /// `value`. Linear scan.
    pub fn find_by_value(&self, value: &V) -> Option<Handle>
    where
        V: PartialEq,
    {
        self.heap
            .iter()
            .copied()
            .find(|&slot| self.element(slot).value == *value)
            .map(|slot| Handle {
                slot,
                generation: self.slots[slot].generation,
            })
    }

    /// Key of the first element whose value equals `value`. Linear scan.
    pub fn find_key_by_value(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.find_by_value(value)
            .map(|handle| &self.element(handle.slot).key)
    }

    /// Elements in heap array order (not sorted)
    pub fn iter(&self) -> impl Iterator<Item = &Element<K, V>> {
        self.heap.iter().map(move |&slot| self.element(slot))
    }

    /// Remove every element
    pub fn clear(&mut self) {
        while let Some(slot) = self.heap.pop() {
            self.wipe(slot);
        }
    }

    /// Check heap order and that every element's `index` matches its slot
    /// in the heap array.
    pub fn is_heap_ordered(&self) -> bool {
        self.heap.iter().enumerate().all(|(i, &slot)| {
            let element = match &self.slots[slot].element {
                Some(element) => element,
                None => return false,
            };
            if element.index != i {
                return false;
            }
            i == 0 || self.key_at(parent(i)) <= &element.key
        })
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn position(&self, handle: Handle) -> Result<usize> {
        match self.slots.get(handle.slot) {
            Some(Slot {
                generation,
                element: Some(element),
            }) if *generation == handle.generation => Ok(element.index),
            _ => Err(QueueError::InvalidHandle),
        }
    }

    fn element(&self, slot: usize) -> &Element<K, V> {
        match &self.slots[slot].element {
            Some(element) => element,
            None => unreachable!("heap references wiped slot {slot}"),
        }
    }

    fn element_mut(&mut self, slot: usize) -> &mut Element<K, V> {
        match &mut self.slots[slot].element {
            Some(element) => element,
            None => unreachable!("heap references wiped slot {slot}"),
        }
    }

    fn key_at(&self, position: usize) -> &K {
        &self.element(self.heap[position]).key
    }

    /// Take the element out of `slot` and retire the slot's generation
    fn wipe(&mut self, slot: usize) -> Element<K, V> {
        let entry = &mut self.slots[slot];
        let element = match entry.element.take() {
            Some(element) => element,
            None => unreachable!("slot {slot} wiped twice"),
        };
        entry.generation += 1;
        self.free.push(slot);
        element
    }

    /// Swap two heap positions and rewrite both elements' indices
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        let (slot_a, slot_b) = (self.heap[a], self.heap[b]);
        self.element_mut(slot_a).index = a;
        self.element_mut(slot_b).index = b;
    }

    /// Move the element at `position` up if it is smaller than its parent,
    /// otherwise down.
    fn reposition(&mut self, position: usize) {
        if position > 0 && self.key_at(position) < self.key_at(parent(position)) {
            self.bubble_up(position);
        } else {
            self.bubble_down(position);
        }
    }

    fn bubble_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = parent(position);
            if self.key_at(position) < self.key_at(parent) {
                self.swap(position, parent);
                position = parent;
            } else {
                break;
            }
        }
    }

    fn bubble_down(&mut self, mut position: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * position + 1;
            if left >= len {
                break;
            }
            let right = left + 1;

            let mut smallest = left;
            if right < len && self.key_at(right) < self.key_at(left) {
                smallest = right;
            }

            if self.key_at(smallest) < self.key_at(position) {
                self.swap(position, smallest);
                position = smallest;
            } else {
                break;
            }
        }
    }
}

#[inline]
fn parent(position: usize) -> usize {
    (position - 1) / 2
}
