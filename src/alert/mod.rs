//! Threshold checking and breach debounce.
//!
//! - `thresholds` classifies a reading against the current ranges.
//! - `breach` remembers which metrics are already alerting.

pub mod breach;
pub mod thresholds;

pub use breach::{BreachState, BreachTracker};
pub use thresholds::evaluate;
