//! Batch scheduling across input trees.
//!
//! The [`BatchScheduler`] enumerates every unit up front, fans them out to a
//! fixed-size worker pool and folds outcomes into a [`BatchResult`]. A single
//! aggregator task owns the counters; workers only send it outcomes.
//!
//! # Example
//!
//! ```ignore
//! use mp3batch_core::batch::{BatchScheduler, NullSink};
//! use mp3batch_core::encoder::FfmpegEncoder;
//!
//! let scheduler = BatchScheduler::new(config.clone(), FfmpegEncoder::new(config.encoder));
//! let result = scheduler
//!     .run(&[PathBuf::from("/downloads")], Path::new("/music"), Arc::new(NullSink))
//!     .await?;
//! println!("{} of {} converted", result.succeeded_units, result.total_units);
//! ```

mod config;
mod error;
mod progress;
mod scheduler;
mod types;

pub use config::BatchConfig;
pub use error::BatchError;
pub use progress::{NullSink, ProgressSink, SessionGuard, SessionSlot};
pub use scheduler::BatchScheduler;
pub use types::{BatchProgress, BatchResult};
