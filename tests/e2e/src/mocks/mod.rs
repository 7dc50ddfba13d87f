//! Test data and time sources

mod fixtures;

pub use fixtures::{TestClock, TestDataFactory};
