//! Error types for the discovery module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that make a discovered unit unconvertible.
///
/// These never abort a walk. They are attached to the unit and reported when
/// the unit is converted. The type is `Clone` because memoized results are
/// handed out more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Descriptor file could not be read.
    #[error("Failed to read descriptor {path}: {reason}")]
    DescriptorUnreadable { path: PathBuf, reason: String },

    /// Descriptor file is not a JSON object.
    #[error("Malformed descriptor {path}: {reason}")]
    DescriptorMalformed { path: PathBuf, reason: String },

    /// Descriptor has no usable title field.
    #[error("Descriptor {path} has no string field '{field}'")]
    MissingTitle { path: PathBuf, field: String },

    /// No audio stream next to the descriptor or below it.
    #[error("Audio file not found in {searched} or its subdirectories")]
    AudioNotFound { searched: PathBuf },
}
