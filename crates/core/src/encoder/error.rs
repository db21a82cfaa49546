//! Error types for the encoder module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::EncodeStage;

/// Errors produced at the encoder process boundary.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Encoder binary not found.
    #[error("Encoder not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// The encoder ran but exited unsuccessfully.
    #[error("Encoder {stage} failed with exit code {code:?}: {stderr}")]
    Failed {
        stage: EncodeStage,
        code: Option<i32>,
        stderr: String,
    },

    /// Spawning or talking to the encoder process failed.
    #[error("I/O error running encoder: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Creates a failed-invocation error from captured stderr.
    pub fn failed(stage: EncodeStage, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Failed {
            stage,
            code,
            stderr: stderr.into(),
        }
    }

    /// Whether the encoder itself is unusable, as opposed to one input failing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EncoderNotFound { .. })
    }
}
