//! Breach state tracking and notification debounce.
//!
//! Each metric is either `Inactive` or `Active`. A notification is sent only
//! on the `Inactive -> Active` edge, so a metric that stays out of range
//! produces one notification per excursion rather than one per reading.
//! Returning to range clears the state silently.
//!
//! State lives only in memory. A restart forgets active breaches and the
//! next still-breaching reading notifies again.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreachState {
    #[default]
    Inactive,
    Active,
}

impl BreachState {
    /// Next state and whether this step starts a new episode.
    fn step(self, out_of_range: bool) -> (BreachState, bool) {
        match (self, out_of_range) {
            (BreachState::Inactive, true) => (BreachState::Active, true),
            (BreachState::Active, true) => (BreachState::Active, false),
            (BreachState::Active, false) => (BreachState::Inactive, false),
            (BreachState::Inactive, false) => (BreachState::Inactive, false),
        }
    }
}

/// Per-metric breach state shared by all concurrent requests.
///
/// One mutex per metric: readings touching different metrics never contend,
/// and two readings for the same metric are serialized so only one of them
/// can observe the `Inactive -> Active` edge.
#[derive(Debug, Default)]
pub struct BreachTracker {
    states: [Mutex<BreachState>; 3],
}

impl BreachTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, metric: Metric) -> BreachState {
        *self.lock(metric)
    }

    /// Whether observing `out_of_range` now would fire a notification.
    /// Does not change state.
    pub fn should_notify(&self, metric: Metric, out_of_range: bool) -> bool {
        self.state(metric).step(out_of_range).1
    }

    /// Applies one observation and returns `true` if it started a new
    /// episode. Call exactly once per metric per reading.
    pub fn observe(&self, metric: Metric, out_of_range: bool) -> bool {
        let mut state = self.lock(metric);
        let (next, fire) = state.step(out_of_range);
        *state = next;
        fire
    }

    fn lock(&self, metric: Metric) -> MutexGuard<'_, BreachState> {
        // The guarded value is a plain enum, always valid after a panic.
        self.states[metric.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
