//! Testing utilities and mock implementations.
//!
//! These let the whole pipeline run without an ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use mp3batch_core::testing::{MockEncoder, RecordingSink};
//!
//! let encoder = MockEncoder::new();
//! encoder.fail_transcode_of("broken");
//!
//! let sink = RecordingSink::new();
//! let result = scheduler.run(&roots, &output, Arc::new(sink.clone())).await?;
//! assert_eq!(sink.events().len(), result.total_units);
//! ```

mod mock_encoder;
mod recording_sink;

pub use mock_encoder::{MockEncoder, RecordedInvocation};
pub use recording_sink::{RecordedEvent, RecordingSink};

/// Test fixtures for building input trees on disk.
pub mod fixtures {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Creates `root/<name>/entry.json` with `title` plus an `audio.m4a` next to it.
    ///
    /// Returns the descriptor path.
    pub fn descriptor_with_audio(root: &Path, name: &str, title: &str) -> io::Result<PathBuf> {
        let dir = root.join(name);
        fs::create_dir_all(&dir)?;
        let descriptor = dir.join("entry.json");
        fs::write(
            &descriptor,
            serde_json::json!({ "title": title, "type_tag": "lua.flv.bili2api.80" }).to_string(),
        )?;
        fs::write(dir.join("audio.m4a"), b"fake aac payload")?;
        Ok(descriptor)
    }

    /// Creates a media file at `root/<relative>`.
    pub fn media_file(root: &Path, relative: &str) -> io::Result<PathBuf> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"fake container payload")?;
        Ok(path)
    }
}
