//! Mock encoder for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::encoder::{EncodeError, EncodeStage, Encoder, Mp3Profile};

/// Bytes written to every mock output.
const MOCK_OUTPUT: &[u8] = b"ID3\x04\x00mock-mp3";

/// A recorded encoder invocation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    /// Which call was made.
    pub stage: EncodeStage,
    /// Input path passed to the encoder.
    pub input: PathBuf,
    /// Output path passed to the encoder.
    pub output: PathBuf,
}

#[derive(Debug, Default)]
struct MockState {
    invocations: Mutex<Vec<RecordedInvocation>>,
    /// Transcodes fail when the input path contains one of these.
    transcode_failures: Mutex<Vec<String>>,
    /// Stream copies fail when the output has one of these extensions.
    stream_copy_failures: Mutex<Vec<String>>,
    unavailable: AtomicBool,
    delay_ms: AtomicU64,
    jitter_ms: AtomicU64,
    sequence: AtomicU64,
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Mock implementation of the [`Encoder`] trait.
///
/// Provides controllable behavior for testing:
/// - Track invocations for assertions
/// - Simulate failures per input or per intermediate container
/// - Simulate encoder latency with jitter
/// - Observe peak concurrency
///
/// Clones share state, so a test can keep one handle and give another to
/// the scheduler.
#[derive(Debug, Clone, Default)]
pub struct MockEncoder {
    state: Arc<MockState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decrements the active-call counter when a call ends.
struct ActiveCall<'a>(&'a AtomicUsize);

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockEncoder {
    /// Create a new mock encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded invocations.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        lock(&self.state.invocations).clone()
    }

    /// Get the number of invocations performed.
    pub fn invocation_count(&self) -> usize {
        lock(&self.state.invocations).len()
    }

    /// Clear recorded invocations.
    pub fn clear_recorded(&self) {
        lock(&self.state.invocations).clear();
    }

    /// Fail every transcode whose input path contains `pattern`.
    pub fn fail_transcode_of(&self, pattern: impl Into<String>) {
        lock(&self.state.transcode_failures).push(pattern.into());
    }

    /// Fail every stream copy into a container with `extension`.
    pub fn fail_stream_copy_into(&self, extension: impl Into<String>) {
        lock(&self.state.stream_copy_failures).push(extension.into());
    }

    /// Make [`Encoder::validate`] report a missing binary.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Set the simulated duration of every call.
    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Add up to `jitter` of varying extra latency per call.
    pub fn set_jitter(&self, jitter: Duration) {
        self.state
            .jitter_ms
            .store(jitter.as_millis() as u64, Ordering::SeqCst);
    }

    /// Highest number of calls observed in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let delay = self.state.delay_ms.load(Ordering::SeqCst);
        let jitter = self.state.jitter_ms.load(Ordering::SeqCst);
        let step = self.state.sequence.fetch_add(1, Ordering::SeqCst);
        let extra = if jitter == 0 {
            0
        } else {
            step.wrapping_mul(2_654_435_761) % (jitter + 1)
        };
        let total = delay + extra;
        if total > 0 {
            tokio::time::sleep(Duration::from_millis(total)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    async fn invoke(
        &self,
        stage: EncodeStage,
        input: &Path,
        output: &Path,
        should_fail: bool,
    ) -> Result<(), EncodeError> {
        lock(&self.state.invocations).push(RecordedInvocation {
            stage,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });

        let now = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(now, Ordering::SeqCst);
        let _active = ActiveCall(&self.state.active);

        self.simulate_latency().await;

        if should_fail {
            return Err(EncodeError::failed(
                stage,
                Some(1),
                format!("mock {stage} failure for {}", input.display()),
            ));
        }
        if !input.is_file() {
            return Err(EncodeError::failed(
                stage,
                Some(1),
                format!("{}: No such file or directory", input.display()),
            ));
        }

        tokio::fs::write(output, MOCK_OUTPUT).await?;
        Ok(())
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), EncodeError> {
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(EncodeError::EncoderNotFound {
                path: PathBuf::from("mock-ffmpeg"),
            });
        }
        Ok(())
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _profile: &Mp3Profile,
    ) -> Result<(), EncodeError> {
        let input_text = input.to_string_lossy();
        let should_fail = lock(&self.state.transcode_failures)
            .iter()
            .any(|p| input_text.contains(p.as_str()));
        self.invoke(EncodeStage::Transcode, input, output, should_fail)
            .await
    }

    async fn stream_copy(&self, input: &Path, output: &Path) -> Result<(), EncodeError> {
        let extension = output
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let should_fail = lock(&self.state.stream_copy_failures)
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&extension));
        self.invoke(EncodeStage::StreamCopy, input, output, should_fail)
            .await
    }
}
