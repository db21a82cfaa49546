//! Error types for the batch module.

use std::path::PathBuf;
use thiserror::Error;

use crate::encoder::EncodeError;

/// Batch-level failures. These are detected before any unit is dispatched.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder cannot be invoked at all.
    #[error("Encoder unavailable: {0}")]
    EncoderUnavailable(#[source] EncodeError),

    /// A batch is already running on this scheduler.
    #[error("A conversion session is already active")]
    SessionActive,

    /// The discovery walk did not complete.
    #[error("Discovery aborted: {0}")]
    DiscoveryAborted(String),

    /// The outcome aggregator did not complete.
    #[error("Progress aggregation aborted: {0}")]
    AggregatorAborted(String),
}
