//! First-in-first-out queue
//!
//! Used for the failed pool, where retry order matters and priority does not.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{QueueError, Result};

/// Plain FIFO sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FifoQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FifoQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append to the tail
    pub fn add(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and return the head
    pub fn remove(&mut self) -> Result<T> {
        self.items.pop_front().ok_or(QueueError::EmptyPool)
    }

    /// The head, without removing it
    pub fn front(&self) -> Result<&T> {
        self.items.front().ok_or(QueueError::EmptyPool)
    }

    /// Re-queue the head at the tail; the rest keep their order
    pub fn move_to_end(&mut self) -> Result<()> {
        let head = self.remove()?;
        self.add(head);
        Ok(())
    }

    /// Remove the item at `position` (0 = head)
    pub fn remove_at(&mut self, position: usize) -> Option<T> {
        self.items.remove(position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Head-to-tail iteration
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl<T> FromIterator<T> for FifoQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for FifoQueue<T> {
    type Item = T;
    type IntoIter = std::collections::vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
