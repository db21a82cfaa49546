//! Progress reporting to the log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use mp3batch_core::{BatchProgress, BatchResult, ConversionOutcome, OutcomeStatus, ProgressSink};

/// Flag shared with the signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Logs one line per completed unit.
#[derive(Debug, Default)]
pub struct LogProgress {
    started: Mutex<Option<Instant>>,
    cancel: CancelHandle,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn elapsed(&self) -> Duration {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }
}

/// Units per second, 0 before any time has passed.
pub fn rate(completed: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        completed as f64 / secs
    } else {
        0.0
    }
}

/// Counter block leading each per-unit log line.
pub fn progress_prefix(progress: BatchProgress, elapsed: Duration) -> String {
    format!(
        "[{}/{} {:.0}% {:.2}/s, {} left, {} failed]",
        progress.completed,
        progress.total,
        progress.percent(),
        rate(progress.completed, elapsed),
        progress.remaining(),
        progress.failed()
    )
}

impl ProgressSink for LogProgress {
    fn on_batch_start(&self, total: usize) {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        info!("Starting batch of {} units", total);
    }

    fn on_unit_complete(&self, outcome: &ConversionOutcome, progress: BatchProgress) {
        let prefix = progress_prefix(progress, self.elapsed());
        match &outcome.status {
            OutcomeStatus::Converted { output } => {
                info!("{} Converted {:?} in {:.1}s", prefix, output, outcome.elapsed.as_secs_f64())
            }
            OutcomeStatus::Skipped { output } => info!("{} Exists {:?}", prefix, output),
            OutcomeStatus::Failed(e) => {
                warn!("{} Failed {:?}: {}", prefix, outcome.unit.source_path, e)
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Final line printed after a batch.
pub fn summary(result: &BatchResult, elapsed: Duration) -> String {
    format!(
        "Processed {} units: {} succeeded, {} failed in {:.1}s ({:.2} units/s)",
        result.total_units,
        result.succeeded_units,
        result.failed_units(),
        elapsed.as_secs_f64(),
        rate(result.total_units, elapsed)
    )
}
