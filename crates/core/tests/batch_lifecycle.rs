//! Batch lifecycle integration tests.
//!
//! These tests drive the scheduler end to end with the mock encoder:
//! - Idempotent reruns
//! - Per-unit failure accounting
//! - Progress event ordering under concurrency
//! - Cancellation of reporting
//! - Errors that prevent a batch from starting

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use mp3batch_core::{
    batch::{BatchError, BatchScheduler, NullSink},
    config::Config,
    discovery::DiscoveryMode,
    encoder::EncodeStage,
    testing::{fixtures, MockEncoder, RecordingSink},
};

/// Test helper holding the input and output trees.
struct TestHarness {
    scheduler: BatchScheduler<MockEncoder>,
    encoder: MockEncoder,
    input: TempDir,
    output: TempDir,
}

impl TestHarness {
    fn new(workers: usize) -> Self {
        let mut config = Config::default();
        config.batch.concurrency = Some(workers);
        Self::with_config(config)
    }

    fn with_config(config: Config) -> Self {
        let encoder = MockEncoder::new();
        Self {
            scheduler: BatchScheduler::new(config, encoder.clone()),
            encoder,
            input: TempDir::new().expect("Failed to create input dir"),
            output: TempDir::new().expect("Failed to create output dir"),
        }
    }

    fn roots(&self) -> Vec<PathBuf> {
        vec![self.input.path().to_path_buf()]
    }

    fn add_descriptor(&self, name: &str, title: &str) {
        fixtures::descriptor_with_audio(self.input.path(), name, title)
            .expect("Failed to create descriptor fixture");
    }

    fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.output.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

fn leftover_intermediates(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with(".mp3batch-")
        })
        .count()
}

#[tokio::test]
async fn test_rerun_skips_existing_outputs() {
    let harness = TestHarness::new(2);
    for i in 1..=3 {
        harness.add_descriptor(&format!("c_{i}"), &format!("Part {i}"));
    }

    let first = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(NullSink))
        .await
        .unwrap();
    assert_eq!((first.total_units, first.succeeded_units), (3, 3));
    assert_eq!(harness.encoder.invocation_count(), 3);

    harness.encoder.clear_recorded();
    let sink = RecordingSink::new();
    let second = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!((second.total_units, second.succeeded_units), (3, 3));
    assert_eq!(harness.encoder.invocation_count(), 0);
    assert!(sink.events().iter().all(|e| e.success));
    assert_eq!(
        harness.output_names(),
        vec!["Part 1.mp3", "Part 2.mp3", "Part 3.mp3"]
    );
}

#[tokio::test]
async fn test_one_failure_among_five() {
    let harness = TestHarness::new(3);
    for i in 1..=4 {
        harness.add_descriptor(&format!("ok_{i}"), &format!("Track {i}"));
    }
    harness.add_descriptor("broken", "Track 5");
    harness.encoder.fail_transcode_of("broken");

    let sink = RecordingSink::new();
    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!(result.total_units, 5);
    assert_eq!(result.succeeded_units, 4);
    assert_eq!(result.failed_units(), 1);

    let failures: Vec<_> = sink.events().into_iter().filter(|e| !e.success).collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].source.to_string_lossy().contains("broken"));
    assert!(failures[0]
        .error
        .as_deref()
        .is_some_and(|msg| msg.contains("mock transcode failure")));

    assert_eq!(sink.finished(), Some(result));
    assert!(!harness.output_names().contains(&"Track 5.mp3".to_string()));
}

#[tokio::test]
async fn test_empty_input_reports_nothing() {
    let harness = TestHarness::new(2);
    std::fs::write(harness.input.path().join("notes.txt"), b"nothing to see").unwrap();

    let sink = RecordingSink::new();
    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!((result.total_units, result.succeeded_units), (0, 0));
    assert_eq!(sink.started_with(), None);
    assert!(sink.events().is_empty());
    assert_eq!(sink.finished(), None);
    assert!(!harness.scheduler.session().is_active());
}

#[tokio::test]
async fn test_title_is_sanitized_into_file_name() {
    let harness = TestHarness::new(1);
    harness.add_descriptor("c_1", "Ep 1: Intro?");

    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(NullSink))
        .await
        .unwrap();

    assert!(result.all_succeeded());
    assert_eq!(harness.output_names(), vec!["Ep 1 Intro.mp3"]);
}

#[tokio::test]
async fn test_direct_media_leaves_no_intermediates() {
    let harness = TestHarness::new(1);
    fixtures::media_file(harness.input.path(), "clips/clip.mp4").unwrap();

    let sink = RecordingSink::new();
    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!((result.total_units, result.succeeded_units), (1, 1));
    assert_eq!(harness.output_names(), vec!["clip.mp3"]);
    assert_eq!(leftover_intermediates(harness.output.path()), 0);

    let stages: Vec<_> = harness
        .encoder
        .invocations()
        .into_iter()
        .map(|inv| inv.stage)
        .collect();
    assert_eq!(stages, vec![EncodeStage::StreamCopy, EncodeStage::Transcode]);
}

#[tokio::test]
async fn test_intermediates_go_to_configured_temp_dir() {
    let scratch = TempDir::new().unwrap();
    let mut config = Config::default();
    config.batch.concurrency = Some(2);
    config.discovery.mode = DiscoveryMode::DirectMedia;
    config.encoder.temp_dir = Some(scratch.path().to_path_buf());
    let harness = TestHarness::with_config(config);
    fixtures::media_file(harness.input.path(), "a.mkv").unwrap();
    fixtures::media_file(harness.input.path(), "b.flv").unwrap();

    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(NullSink))
        .await
        .unwrap();

    assert!(result.all_succeeded());
    assert_eq!(harness.output_names(), vec!["a.mp3", "b.mp3"]);
    for inv in harness.encoder.invocations() {
        if inv.stage == EncodeStage::StreamCopy {
            assert_eq!(inv.output.parent(), Some(scratch.path()));
        }
    }
    assert_eq!(leftover_intermediates(scratch.path()), 0);
}

#[tokio::test]
async fn test_same_title_collides_within_run() {
    let harness = TestHarness::new(2);
    harness.add_descriptor("c_1", "Same");
    harness.add_descriptor("c_2", "Same");

    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(NullSink))
        .await
        .unwrap();

    assert_eq!((result.total_units, result.succeeded_units), (2, 1));
    assert_eq!(harness.output_names(), vec!["Same.mp3"]);
}

#[tokio::test]
async fn test_randomized_progress_is_ordered_and_bounded() {
    for _ in 0..3 {
        let units: usize = rand::random_range(6..24);
        let workers: usize = rand::random_range(2..units.min(6));
        let harness = TestHarness::new(workers);
        harness.encoder.set_delay(Duration::from_millis(2));
        harness.encoder.set_jitter(Duration::from_millis(8));

        let mut expected_failures = 0;
        for i in 0..units {
            if rand::random_bool(0.2) {
                harness.add_descriptor(&format!("broken_{i}"), &format!("Unit {i}"));
                expected_failures += 1;
            } else {
                harness.add_descriptor(&format!("c_{i}"), &format!("Unit {i}"));
            }
        }
        harness.encoder.fail_transcode_of("broken_");

        let sink = RecordingSink::new();
        let result = harness
            .scheduler
            .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
            .await
            .unwrap();

        assert_eq!(result.total_units, units);
        assert_eq!(result.succeeded_units, units - expected_failures);
        assert_eq!(sink.started_with(), Some(units));

        let events = sink.events();
        assert_eq!(events.len(), units);
        let sources: HashSet<_> = events.iter().map(|e| e.source.clone()).collect();
        assert_eq!(sources.len(), units);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.progress.completed, i + 1);
            assert_eq!(event.progress.total, units);
        }
        assert!(harness.encoder.peak_concurrency() <= workers);
    }
}

#[tokio::test]
async fn test_cancel_stops_reporting_but_finishes_work() {
    let harness = TestHarness::new(1);
    for i in 1..=5 {
        harness.add_descriptor(&format!("c_{i}"), &format!("Part {i}"));
    }

    let sink = RecordingSink::new();
    sink.cancel_after(2);
    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!((result.total_units, result.succeeded_units), (5, 5));
    assert_eq!(sink.events().len(), 2);
    assert_eq!(sink.finished(), None);
    assert_eq!(harness.output_names().len(), 5);
}

#[tokio::test]
async fn test_missing_encoder_prevents_start() {
    let harness = TestHarness::new(1);
    harness.add_descriptor("c_1", "Part 1");
    harness.encoder.set_unavailable(true);

    let sink = RecordingSink::new();
    let err = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::EncoderUnavailable(_)));
    assert_eq!(sink.started_with(), None);
    assert_eq!(harness.encoder.invocation_count(), 0);
}

#[tokio::test]
async fn test_uncreatable_output_directory() {
    let harness = TestHarness::new(1);
    harness.add_descriptor("c_1", "Part 1");
    let blocker = harness.output.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();

    let err = harness
        .scheduler
        .run(&harness.roots(), &blocker.join("out"), Arc::new(NullSink))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::OutputDirectory { .. }));
}

#[tokio::test]
async fn test_overlapping_run_is_rejected() {
    let harness = TestHarness::new(1);
    for i in 1..=4 {
        harness.add_descriptor(&format!("c_{i}"), &format!("Part {i}"));
    }
    harness.encoder.set_delay(Duration::from_millis(50));

    let roots = harness.roots();
    let (a, b) = tokio::join!(
        harness
            .scheduler
            .run(&roots, harness.output.path(), Arc::new(NullSink)),
        harness
            .scheduler
            .run(&roots, harness.output.path(), Arc::new(NullSink)),
    );

    let outcomes = [a, b];
    let rejected = outcomes
        .iter()
        .filter(|r| matches!(r, Err(BatchError::SessionActive)))
        .count();
    let completed: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(rejected, 1);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].succeeded_units, 4);
    assert!(!harness.scheduler.session().is_active());
}

#[tokio::test]
async fn test_unresolvable_units_count_as_processed_failures() {
    let harness = TestHarness::new(2);
    for i in 1..=3 {
        harness.add_descriptor(&format!("c_{i}"), &format!("Part {i}"));
    }

    let malformed = harness.input.path().join("bad_json");
    std::fs::create_dir_all(&malformed).unwrap();
    std::fs::write(malformed.join("entry.json"), b"{not json").unwrap();
    std::fs::write(malformed.join("audio.m4a"), b"aac").unwrap();

    let silent = harness.input.path().join("no_audio");
    std::fs::create_dir_all(&silent).unwrap();
    std::fs::write(silent.join("entry.json"), r#"{"title":"Silent"}"#).unwrap();

    let sink = RecordingSink::new();
    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!((result.total_units, result.succeeded_units), (5, 3));
    assert_eq!(sink.started_with(), Some(5));

    let events = sink.events();
    assert_eq!(events.len(), 5);
    assert_eq!(events.last().map(|e| e.progress.completed), Some(5));
    let failed: HashSet<_> = events
        .iter()
        .filter(|e| !e.success)
        .map(|e| e.source.parent().unwrap().to_path_buf())
        .collect();
    assert_eq!(failed, HashSet::from([malformed, silent]));

    assert_eq!(harness.encoder.invocation_count(), 3);
    assert_eq!(
        harness.output_names(),
        vec!["Part 1.mp3", "Part 2.mp3", "Part 3.mp3"]
    );
}

#[tokio::test]
async fn test_long_multibyte_title_fits_file_name_limit() {
    let harness = TestHarness::new(1);
    harness.add_descriptor("c_1", &"第".repeat(120));

    let sink = RecordingSink::new();
    let result = harness
        .scheduler
        .run(&harness.roots(), harness.output.path(), Arc::new(sink.clone()))
        .await
        .unwrap();

    assert_eq!((result.total_units, result.succeeded_units), (1, 1));
    let names = harness.output_names();
    assert_eq!(names.len(), 1);
    assert!(names[0].len() <= 255);
    assert!(names[0].ends_with(".mp3"));
    assert!(names[0].starts_with("第"));
}
