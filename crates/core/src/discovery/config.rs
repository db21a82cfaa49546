//! Configuration for the discovery module.

use serde::{Deserialize, Serialize};

use super::types::DiscoveryMode;

/// Walk and matching policy for input trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// How input roots are interpreted.
    #[serde(default)]
    pub mode: DiscoveryMode,

    /// File name of the metadata descriptor.
    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    /// JSON field holding the title.
    #[serde(default = "default_title_field")]
    pub title_field: String,

    /// Maximum depth of the root walk.
    #[serde(default = "default_max_walk_depth")]
    pub max_walk_depth: usize,

    /// Subdirectory levels searched below a descriptor for its audio.
    #[serde(default = "default_audio_search_depth")]
    pub audio_search_depth: usize,

    /// Well-known audio file names, checked in order next to the descriptor.
    #[serde(default = "default_audio_file_names")]
    pub audio_file_names: Vec<String>,

    /// Extensions accepted as descriptor-paired audio.
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,

    /// Subdirectory names preferred when searching for audio.
    #[serde(default = "default_audio_dir_names")]
    pub audio_dir_names: Vec<String>,

    /// Extensions treated as direct-media containers.
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,
}

fn default_descriptor_file() -> String {
    "entry.json".to_string()
}

fn default_title_field() -> String {
    "title".to_string()
}

fn default_max_walk_depth() -> usize {
    32
}

fn default_audio_search_depth() -> usize {
    2
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_audio_extensions() -> Vec<String> {
    strings(&["m4a", "mp4", "aac", "flv", "m4s"])
}

fn default_audio_file_names() -> Vec<String> {
    default_audio_extensions()
        .iter()
        .map(|ext| format!("audio.{ext}"))
        .collect()
}

fn default_audio_dir_names() -> Vec<String> {
    strings(&["audio", "sound", "voice", "music"])
}

fn default_media_extensions() -> Vec<String> {
    strings(&["mp4", "mkv", "flv", "avi", "mov", "wmv", "m4s"])
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::default(),
            descriptor_file: default_descriptor_file(),
            title_field: default_title_field(),
            max_walk_depth: default_max_walk_depth(),
            audio_search_depth: default_audio_search_depth(),
            audio_file_names: default_audio_file_names(),
            audio_extensions: default_audio_extensions(),
            audio_dir_names: default_audio_dir_names(),
            media_extensions: default_media_extensions(),
        }
    }
}

impl DiscoveryConfig {
    /// Sets the discovery mode.
    pub fn with_mode(mut self, mode: DiscoveryMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.descriptor_file, "entry.json");
        assert_eq!(config.title_field, "title");
        assert_eq!(config.audio_search_depth, 2);
        assert_eq!(config.audio_file_names[0], "audio.m4a");
        assert!(config.media_extensions.contains(&"mkv".to_string()));
        assert!(config.audio_extensions.contains(&"m4s".to_string()));
    }

    #[test]
    fn test_mode_builder() {
        let config = DiscoveryConfig::default().with_mode(DiscoveryMode::Descriptor);
        assert_eq!(config.mode, DiscoveryMode::Descriptor);
    }
}
