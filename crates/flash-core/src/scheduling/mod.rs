//! Scheduling Module
//!
//! Review grades and the interval algorithm that turns a grade into the next
//! review interval and an updated easiness coefficient.
//!
//! ## Core Formulas:
//! - pass, 1st recall: interval = 1 day
//! - pass, 2nd recall: interval = 6 days
//! - pass, later: interval = interval * EF, EF' = EF + 0.1 - (2-g)(0.08 + (2-g)0.02), EF' >= 1.3
//! - fail: repetition = 0, interval = 1 day

mod algorithm;
mod grade;

pub use algorithm::{
    due_after, latest_due, IntervalAlgorithm, IntervalParameters, ReviewState, FIRST_INTERVAL,
    INITIAL_EASINESS, MIN_EASINESS, SECOND_INTERVAL,
};
pub use grade::{Grade, GradeError};
