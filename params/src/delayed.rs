//! A single schedule-then-apply value.

use serde::{Deserialize, Serialize};
use tally_types::{Timestamp, WEEK};

/// Notice period between scheduling a value and it taking effect.
pub const PARAM_UPDATE_DELAY: u64 = WEEK;

/// A parameter whose changes become visible only after a fixed delay.
///
/// Reads before `effective_at` return `current`; reads at or after it return
/// `pending`. Scheduling first folds an already-effective pending value into
/// `current`, so overlapping schedules never resurrect a stale value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedParam<T> {
    current: T,
    pending: T,
    effective_at: Timestamp,
}

impl<T: Copy> DelayedParam<T> {
    /// A parameter that holds `initial` from genesis, with nothing scheduled.
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            pending: initial,
            effective_at: Timestamp::EPOCH,
        }
    }

    /// The value in force at `now`.
    pub fn get(&self, now: Timestamp) -> T {
        if now < self.effective_at {
            self.current
        } else {
            self.pending
        }
    }

    /// Schedule `value` to take effect at `now + PARAM_UPDATE_DELAY`.
    ///
    /// Range validation is the caller's job; see [`crate::StakingParams`].
    pub fn schedule(&mut self, value: T, now: Timestamp) -> Timestamp {
        self.current = self.get(now);
        self.pending = value;
        self.effective_at = now.saturating_add(PARAM_UPDATE_DELAY);
        self.effective_at
    }

    /// The most recently scheduled value, whether or not it is in force yet.
    pub fn pending(&self) -> T {
        self.pending
    }

    pub fn effective_at(&self) -> Timestamp {
        self.effective_at
    }

    /// Whether a scheduled value is still waiting for its delay at `now`.
    pub fn is_pending(&self, now: Timestamp) -> bool {
        now < self.effective_at
    }
}
