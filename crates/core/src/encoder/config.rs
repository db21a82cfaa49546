//! Configuration for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::Mp3Profile;

/// Configuration for the ffmpeg-based encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// libmp3lame VBR quality, 0 (best) to 9.
    #[serde(default)]
    pub vbr_quality: u8,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Intermediate containers tried in order when demuxing a stream.
    #[serde(default = "default_intermediate_formats")]
    pub intermediate_formats: Vec<String>,

    /// Directory for intermediate files. Defaults to the output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,

    /// Additional ffmpeg arguments placed before the output path.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_intermediate_formats() -> Vec<String> {
    vec!["aac".to_string(), "m4a".to_string(), "mka".to_string()]
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            vbr_quality: 0,
            log_level: default_log_level(),
            intermediate_formats: default_intermediate_formats(),
            temp_dir: None,
            extra_args: Vec::new(),
        }
    }
}

impl EncoderConfig {
    /// Creates a config pointing at a specific ffmpeg binary.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the VBR quality.
    pub fn with_vbr_quality(mut self, quality: u8) -> Self {
        self.vbr_quality = quality;
        self
    }

    /// Sets the intermediate file directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// The MP3 profile derived from this config.
    pub fn profile(&self) -> Mp3Profile {
        Mp3Profile {
            vbr_quality: self.vbr_quality,
        }
    }
}
