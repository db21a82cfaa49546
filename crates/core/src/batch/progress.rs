//! Progress reporting capability and session handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::converter::ConversionOutcome;

use super::types::{BatchProgress, BatchResult};

/// Consumer of per-unit outcome events, such as a progress window.
///
/// Calls come from a single aggregator task, one per completed unit, in
/// completion order. Implementations should return quickly.
pub trait ProgressSink: Send + Sync {
    /// A session opened for `total` units. Not called when nothing was found.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// One unit finished.
    fn on_unit_complete(&self, outcome: &ConversionOutcome, progress: BatchProgress);

    /// Polled between units. Once true, no further events are delivered;
    /// units already dispatched still run to completion.
    fn cancel_requested(&self) -> bool {
        false
    }

    /// Every unit has produced its outcome. Skipped after cancellation.
    fn on_batch_finish(&self, result: &BatchResult) {
        let _ = result;
    }
}

/// A sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_unit_complete(&self, _outcome: &ConversionOutcome, _progress: BatchProgress) {}
}

/// Tracks whether a conversion session is open.
///
/// Whoever composes the pipeline with a presentation layer owns the slot and
/// can check it before opening another window. Clones observe the same slot.
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    active: Arc<AtomicBool>,
}

impl SessionSlot {
    /// Creates an idle slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the session, or returns `None` if one is already open.
    pub fn try_open(&self) -> Option<SessionGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionGuard {
                active: Arc::clone(&self.active),
            })
    }

    /// Whether a session is currently open.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// An open session. Dropping it closes the session.
#[derive(Debug)]
pub struct SessionGuard {
    active: Arc<AtomicBool>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
