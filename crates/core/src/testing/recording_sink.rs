//! Progress sink that records everything it is told.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::batch::{BatchProgress, BatchResult, ProgressSink};
use crate::converter::ConversionOutcome;

/// One `on_unit_complete` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Source of the completed unit.
    pub source: PathBuf,
    /// Whether the unit succeeded.
    pub success: bool,
    /// Failure text, if any.
    pub error: Option<String>,
    /// Counters after this unit.
    pub progress: BatchProgress,
}

#[derive(Debug, Default)]
struct SinkState {
    started: Mutex<Option<usize>>,
    events: Mutex<Vec<RecordedEvent>>,
    finished: Mutex<Option<BatchResult>>,
    cancel_after: Mutex<Option<usize>>,
}

/// A [`ProgressSink`] for assertions. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<SinkState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingSink {
    /// Create a new recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation once `count` events have been recorded.
    pub fn cancel_after(&self, count: usize) {
        *lock(&self.state.cancel_after) = Some(count);
    }

    /// Total passed to `on_batch_start`, if a session was opened.
    pub fn started_with(&self) -> Option<usize> {
        *lock(&self.state.started)
    }

    /// All recorded completion events, in arrival order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        lock(&self.state.events).clone()
    }

    /// Result passed to `on_batch_finish`, if any.
    pub fn finished(&self) -> Option<BatchResult> {
        *lock(&self.state.finished)
    }
}

impl ProgressSink for RecordingSink {
    fn on_batch_start(&self, total: usize) {
        *lock(&self.state.started) = Some(total);
    }

    fn on_unit_complete(&self, outcome: &ConversionOutcome, progress: BatchProgress) {
        lock(&self.state.events).push(RecordedEvent {
            source: outcome.unit.source_path.clone(),
            success: outcome.success(),
            error: outcome.error_message(),
            progress,
        });
    }

    fn cancel_requested(&self) -> bool {
        match *lock(&self.state.cancel_after) {
            Some(limit) => lock(&self.state.events).len() >= limit,
            None => false,
        }
    }

    fn on_batch_finish(&self, result: &BatchResult) {
        *lock(&self.state.finished) = Some(*result);
    }
}
