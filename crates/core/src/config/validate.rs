use super::{types::Config, ConfigError};
use crate::encoder::MAX_VBR_QUALITY;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration
/// Currently validates:
/// - VBR quality is within libmp3lame's 0..=9
/// - Intermediate format and extension lists are not empty
/// - Descriptor file and title field are set
/// - Explicit concurrency is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Encoder validation
    if config.encoder.vbr_quality > MAX_VBR_QUALITY {
        return Err(invalid(format!(
            "encoder.vbr_quality must be between 0 and {MAX_VBR_QUALITY}"
        )));
    }
    if config.encoder.intermediate_formats.is_empty() {
        return Err(invalid("encoder.intermediate_formats cannot be empty"));
    }

    // Discovery validation
    let discovery = &config.discovery;
    if discovery.descriptor_file.trim().is_empty() {
        return Err(invalid("discovery.descriptor_file cannot be empty"));
    }
    if discovery.title_field.trim().is_empty() {
        return Err(invalid("discovery.title_field cannot be empty"));
    }
    if discovery.audio_extensions.is_empty() {
        return Err(invalid("discovery.audio_extensions cannot be empty"));
    }
    if discovery.media_extensions.is_empty() {
        return Err(invalid("discovery.media_extensions cannot be empty"));
    }
    if discovery.max_walk_depth == 0 {
        return Err(invalid("discovery.max_walk_depth cannot be 0"));
    }

    // Batch validation
    if config.batch.concurrency == Some(0) {
        return Err(invalid("batch.concurrency cannot be 0"));
    }

    Ok(())
}
