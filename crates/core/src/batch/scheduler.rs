//! Batch scheduler implementation.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::converter::{ConversionError, ConversionOutcome, UnitConverter};
use crate::discovery::{AssetLocator, ConversionUnit, DiscoveryConfig};
use crate::encoder::{Encoder, EncoderConfig};

use super::config::BatchConfig;
use super::error::BatchError;
use super::progress::{ProgressSink, SessionSlot};
use super::types::{BatchProgress, BatchResult};

/// Units waiting for a worker.
type UnitQueue = Arc<Mutex<VecDeque<ConversionUnit>>>;

/// Runs batches of conversions over a bounded worker pool.
pub struct BatchScheduler<E: Encoder> {
    encoder: Arc<E>,
    encoder_config: EncoderConfig,
    discovery_config: DiscoveryConfig,
    batch_config: BatchConfig,
    session: SessionSlot,
}

impl<E: Encoder + 'static> BatchScheduler<E> {
    /// Creates a scheduler from a full configuration.
    pub fn new(config: Config, encoder: E) -> Self {
        Self {
            encoder: Arc::new(encoder),
            encoder_config: config.encoder,
            discovery_config: config.discovery,
            batch_config: config.batch,
            session: SessionSlot::new(),
        }
    }

    /// Number of workers a run will use at most.
    pub fn concurrency(&self) -> usize {
        self.batch_config.effective_concurrency()
    }

    /// Handle to this scheduler's session slot.
    pub fn session(&self) -> SessionSlot {
        self.session.clone()
    }

    /// Converts every unit found under `roots` into `output_dir`.
    ///
    /// Blocks until all dispatched units have produced an outcome. Per-unit
    /// failures only lower `succeeded_units`; an `Err` means nothing was
    /// dispatched.
    pub async fn run(
        &self,
        roots: &[PathBuf],
        output_dir: &Path,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<BatchResult, BatchError> {
        let start = Instant::now();

        self.encoder
            .validate()
            .await
            .map_err(BatchError::EncoderUnavailable)?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| BatchError::OutputDirectory {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let locator = Arc::new(AssetLocator::new(self.discovery_config.clone()));
        let units = {
            let locator = Arc::clone(&locator);
            let roots = roots.to_vec();
            tokio::task::spawn_blocking(move || locator.discover_all(&roots))
                .await
                .map_err(|e| BatchError::DiscoveryAborted(e.to_string()))?
        };

        let total = units.len();
        if total == 0 {
            info!("No convertible units found in {} input root(s)", roots.len());
            return Ok(BatchResult::empty());
        }

        let _session = self.session.try_open().ok_or(BatchError::SessionActive)?;
        sink.on_batch_start(total);

        let workers = self.concurrency().min(total);
        info!(
            "Converting {} units with {} workers using {}",
            total,
            workers,
            self.encoder.name()
        );

        let converter = Arc::new(UnitConverter::new(
            locator,
            Arc::clone(&self.encoder),
            &self.encoder_config,
        ));
        let queue: UnitQueue = Arc::new(Mutex::new(VecDeque::from(units)));
        let (outcome_tx, outcome_rx) = mpsc::channel(workers * 2);

        let aggregator = tokio::spawn(aggregate(outcome_rx, total, Arc::clone(&sink)));

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(run_worker(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&converter),
                output_dir.to_path_buf(),
                outcome_tx.clone(),
            ));
        }
        drop(outcome_tx);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!("Worker task failed: {}", e);
            }
        }

        let (result, reporting) = aggregator
            .await
            .map_err(|e| BatchError::AggregatorAborted(e.to_string()))?;

        info!(
            "Batch finished: {}/{} succeeded in {:.1}s",
            result.succeeded_units,
            result.total_units,
            start.elapsed().as_secs_f64()
        );
        if reporting {
            sink.on_batch_finish(&result);
        }
        Ok(result)
    }
}

fn next_unit(queue: &UnitQueue) -> Option<ConversionUnit> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

/// Pulls units until the queue is empty, sending one outcome per unit.
async fn run_worker<E: Encoder + 'static>(
    worker_id: usize,
    queue: UnitQueue,
    converter: Arc<UnitConverter<E>>,
    output_dir: PathBuf,
    outcome_tx: mpsc::Sender<ConversionOutcome>,
) {
    let mut handled = 0usize;
    while let Some(unit) = next_unit(&queue) {
        let outcome = convert_isolated(Arc::clone(&converter), unit, output_dir.clone()).await;
        handled += 1;
        if outcome_tx.send(outcome).await.is_err() {
            error!("Worker {}: outcome channel closed", worker_id);
            break;
        }
    }
    debug!("Worker {} drained after {} units", worker_id, handled);
}

/// Runs one unit in its own task so a panic becomes a failed outcome.
async fn convert_isolated<E: Encoder + 'static>(
    converter: Arc<UnitConverter<E>>,
    unit: ConversionUnit,
    output_dir: PathBuf,
) -> ConversionOutcome {
    let task_unit = unit.clone();
    let handle =
        tokio::spawn(async move { converter.convert(&task_unit, &output_dir).await });
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Conversion of {:?} aborted: {}", unit.source_path, e);
            ConversionOutcome::failed(unit, ConversionError::Aborted(e.to_string()))
        }
    }
}

/// Owns the counters; the only place they change.
///
/// Returns the final result and whether reporting was still on at the end.
async fn aggregate(
    mut outcome_rx: mpsc::Receiver<ConversionOutcome>,
    total: usize,
    sink: Arc<dyn ProgressSink>,
) -> (BatchResult, bool) {
    let mut progress = BatchProgress::new(total);
    let mut reporting = true;

    while let Some(outcome) = outcome_rx.recv().await {
        progress.record(outcome.success());

        if reporting && sink.cancel_requested() {
            info!(
                "Progress reporting cancelled at {}/{}; in-flight units continue",
                progress.completed, progress.total
            );
            reporting = false;
        }
        if reporting {
            sink.on_unit_complete(&outcome, progress);
        }
    }

    if progress.completed != total {
        error!(
            "Expected {} outcomes but received {}",
            total, progress.completed
        );
    }
    (progress.into_result(), reporting)
}
