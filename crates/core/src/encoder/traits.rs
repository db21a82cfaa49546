//! Trait definitions for the encoder module.

use async_trait::async_trait;
use std::path::Path;

use super::error::EncodeError;
use super::types::Mp3Profile;

/// An external encoder that converts media files.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Validates that the encoder can be invoked at all.
    async fn validate(&self) -> Result<(), EncodeError>;

    /// Transcodes `input` into an MP3 at `output` using `profile`.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        profile: &Mp3Profile,
    ) -> Result<(), EncodeError>;

    /// Copies the audio stream of `input` verbatim into `output`.
    ///
    /// The container is chosen from the extension of `output`.
    async fn stream_copy(&self, input: &Path, output: &Path) -> Result<(), EncodeError>;
}
