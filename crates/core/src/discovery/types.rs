//! Types for the discovery module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How an input tree is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Descriptor-based if the tree holds any descriptor file, direct-media otherwise.
    #[default]
    Auto,
    /// Descriptor file paired with a co-located audio stream.
    Descriptor,
    /// Every matching video/container file is a unit.
    DirectMedia,
}

/// What kind of source a unit points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// `source_path` is a descriptor file.
    DescriptorBased,
    /// `source_path` is a media container.
    DirectMedia,
}

/// One source to convert.
///
/// Units are immutable. The display name and the audio stream behind a
/// descriptor are resolved lazily through [`super::AssetLocator::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionUnit {
    /// Absolute path to a descriptor file or a media container.
    pub source_path: PathBuf,
    /// Kind of source.
    pub kind: UnitKind,
}

impl ConversionUnit {
    /// A unit anchored at a descriptor file.
    pub fn descriptor(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: path.into(),
            kind: UnitKind::DescriptorBased,
        }
    }

    /// A unit for a media container.
    pub fn direct_media(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: path.into(),
            kind: UnitKind::DirectMedia,
        }
    }

    /// Directory containing the source file.
    pub fn source_dir(&self) -> &Path {
        self.source_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// A unit whose title and audio stream have been located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    /// Unsanitized title, from descriptor metadata or the file stem.
    pub display_name: String,
    /// File handed to the encoder.
    pub audio_path: PathBuf,
}
