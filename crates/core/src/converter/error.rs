//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::encoder::EncodeError;

/// Reasons a single unit failed. None of these abort the batch.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Descriptor or audio stream could not be resolved.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The title sanitized to nothing.
    #[error("No usable file name for {source_path} (derived from {raw:?})")]
    InvalidName { source_path: PathBuf, raw: String },

    /// The encoder failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Filesystem error while preparing the output.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another unit in the same run already targets this destination.
    #[error("Destination {destination} is already claimed by {owner} in this batch")]
    DestinationCollision { destination: PathBuf, owner: PathBuf },

    /// The conversion task panicked or was aborted.
    #[error("Conversion task aborted: {0}")]
    Aborted(String),
}

impl ConversionError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
