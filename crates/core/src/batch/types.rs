//! Types for the batch module.

use serde::{Deserialize, Serialize};

/// Final totals of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Units discovered and dispatched.
    pub total_units: usize,
    /// Units converted or already present.
    pub succeeded_units: usize,
}

impl BatchResult {
    /// A run that found nothing to do.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Units that failed.
    pub fn failed_units(&self) -> usize {
        self.total_units - self.succeeded_units
    }

    /// Whether every unit succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded_units == self.total_units
    }
}

/// Running counters, as seen after one more unit completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Units finished so far, successful or not.
    pub completed: usize,
    /// Units that succeeded so far.
    pub succeeded: usize,
    /// Units in the batch.
    pub total: usize,
}

impl BatchProgress {
    /// Starting counters for `total` units.
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            succeeded: 0,
            total,
        }
    }

    /// Units that failed so far.
    pub fn failed(&self) -> usize {
        self.completed - self.succeeded
    }

    /// Units not finished yet.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Completion percentage, capped at 100.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f32 / self.total as f32 * 100.0).min(100.0)
    }

    /// Records one more outcome.
    pub(crate) fn record(&mut self, success: bool) {
        self.completed += 1;
        if success {
            self.succeeded += 1;
        }
    }

    /// Freezes the counters into a result.
    pub(crate) fn into_result(self) -> BatchResult {
        BatchResult {
            total_units: self.total,
            succeeded_units: self.succeeded,
        }
    }
}
