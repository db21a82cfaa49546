//! Configuration for the batch module.

use serde::{Deserialize, Serialize};

/// Worker pool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of concurrent conversions. Defaults to logical CPUs minus one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

/// Upper bound of the default pool on Windows.
pub const WINDOWS_MAX_DEFAULT_CONCURRENCY: usize = 8;

/// Logical CPU count minus one, leaving a core for the OS, never below one.
///
/// On Windows the default is additionally capped at
/// [`WINDOWS_MAX_DEFAULT_CONCURRENCY`]. An explicit concurrency is never capped.
pub fn default_concurrency() -> usize {
    clamp_for_platform(num_cpus::get().saturating_sub(1).max(1))
}

#[cfg(windows)]
fn clamp_for_platform(workers: usize) -> usize {
    workers.min(WINDOWS_MAX_DEFAULT_CONCURRENCY)
}

#[cfg(not(windows))]
fn clamp_for_platform(workers: usize) -> usize {
    workers
}

impl BatchConfig {
    /// Sets an explicit concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// The pool size actually used.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(default_concurrency).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_concurrency_leaves_a_core() {
        let config = BatchConfig::default();
        let expected = clamp_for_platform(num_cpus::get().saturating_sub(1).max(1));
        assert_eq!(config.effective_concurrency(), expected);
        assert!(config.effective_concurrency() >= 1);
    }

    #[test]
    fn test_explicit_concurrency() {
        assert_eq!(BatchConfig::default().with_concurrency(3).effective_concurrency(), 3);
        assert_eq!(BatchConfig::default().with_concurrency(0).effective_concurrency(), 1);
    }

    #[test]
    fn test_explicit_concurrency_is_not_capped() {
        let config = BatchConfig::default().with_concurrency(WINDOWS_MAX_DEFAULT_CONCURRENCY * 4);
        assert_eq!(
            config.effective_concurrency(),
            WINDOWS_MAX_DEFAULT_CONCURRENCY * 4
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_default_is_capped() {
        assert_eq!(clamp_for_platform(64), WINDOWS_MAX_DEFAULT_CONCURRENCY);
        assert_eq!(clamp_for_platform(3), 3);
        assert!(default_concurrency() <= WINDOWS_MAX_DEFAULT_CONCURRENCY);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_default_is_uncapped_elsewhere() {
        assert_eq!(clamp_for_platform(64), 64);
    }
}
