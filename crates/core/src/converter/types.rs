//! Types for the converter module.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::ConversionUnit;

use super::error::ConversionError;

/// How a unit ended.
#[derive(Debug)]
pub enum OutcomeStatus {
    /// The encoder produced a new file.
    Converted { output: PathBuf },
    /// A non-empty file was already there.
    Skipped { output: PathBuf },
    /// The unit failed.
    Failed(ConversionError),
}

/// Result of one conversion attempt. Produced exactly once per unit.
#[derive(Debug)]
pub struct ConversionOutcome {
    /// The unit this outcome belongs to.
    pub unit: ConversionUnit,
    /// What happened.
    pub status: OutcomeStatus,
    /// Wall time spent on the unit.
    pub elapsed: Duration,
}

impl ConversionOutcome {
    /// Creates an outcome.
    pub fn new(unit: ConversionUnit, status: OutcomeStatus, elapsed: Duration) -> Self {
        Self {
            unit,
            status,
            elapsed,
        }
    }

    /// Creates a failed outcome.
    pub fn failed(unit: ConversionUnit, error: ConversionError) -> Self {
        Self::new(unit, OutcomeStatus::Failed(error), Duration::ZERO)
    }

    /// Converted and skipped units both count as success.
    pub fn success(&self) -> bool {
        !matches!(self.status, OutcomeStatus::Failed(_))
    }

    /// Whether the unit was satisfied by a pre-existing file.
    pub fn skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped { .. })
    }

    /// The produced or pre-existing MP3.
    pub fn output_path(&self) -> Option<&Path> {
        match &self.status {
            OutcomeStatus::Converted { output } | OutcomeStatus::Skipped { output } => {
                Some(output)
            }
            OutcomeStatus::Failed(_) => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&ConversionError> {
        match &self.status {
            OutcomeStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Human-readable failure text, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}
