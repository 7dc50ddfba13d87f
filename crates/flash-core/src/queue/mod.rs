//! Queue Module
//!
//! Containers backing the deck pools:
//! - [`AdaptablePriorityQueue`]: min-heap keyed by due time with stable handles
//! - [`FifoQueue`]: retry queue for failed cards
//! - [`Element`]: heap slot wrapper (key, value, position)

mod adaptable;
mod element;
mod fifo;

pub use adaptable::{AdaptablePriorityQueue, Handle};
pub use element::Element;
pub use fifo::FifoQueue;

/// Queue error type
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// `min` on a queue with no elements
    #[error("Queue is empty")]
    Empty,
    /// Read or pop from an exhausted FIFO pool
    #[error("Pool is empty")]
    EmptyPool,
    /// The handle's element has been removed
    #[error("Handle is no longer valid (element was removed)")]
    InvalidHandle,
}

/// Queue result type
pub type Result<T> = std::result::Result<T, QueueError>;
