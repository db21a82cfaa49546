//! Types shared by encoder implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest (worst) libmp3lame VBR quality level.
pub const MAX_VBR_QUALITY: u8 = 9;

/// Quality profile used for every MP3 the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mp3Profile {
    /// libmp3lame variable bitrate quality (0 = best, 9 = smallest).
    pub vbr_quality: u8,
}

impl Default for Mp3Profile {
    fn default() -> Self {
        Self { vbr_quality: 0 }
    }
}

/// Which encoder invocation an error or recording belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeStage {
    /// `-version` availability probe.
    Probe,
    /// Lossless demux of the audio stream.
    StreamCopy,
    /// Transcode to MP3.
    Transcode,
}

impl fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Probe => "version probe",
            Self::StreamCopy => "stream copy",
            Self::Transcode => "transcode",
        };
        f.write_str(label)
    }
}
