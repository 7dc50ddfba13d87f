//! End-to-end test support for Flash
//!
//! - [`harness`]: isolated SQLite stores in temporary directories
//! - [`mocks`]: deterministic clocks and card data

pub mod harness;
pub mod mocks;

pub use harness::TestStoreManager;
pub use mocks::{TestClock, TestDataFactory};
