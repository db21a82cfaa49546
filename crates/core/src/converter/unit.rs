//! Converter for a single discovered unit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tempfile::TempPath;
use tracing::{debug, error, info, warn};

use crate::discovery::{AssetLocator, ConversionUnit, ResolvedUnit, UnitKind};
use crate::encoder::{EncodeError, EncodeStage, Encoder, EncoderConfig, Mp3Profile};
use crate::sanitize::usable_name;

use super::error::ConversionError;
use super::types::{ConversionOutcome, OutcomeStatus};

/// Extension of every produced file.
const OUTPUT_EXTENSION: &str = "mp3";

/// Prefix of intermediate demux files.
const INTERMEDIATE_PREFIX: &str = ".mp3batch-";

/// Converts units into MP3 files.
///
/// One converter serves one batch run: it shares the run's [`AssetLocator`]
/// and tracks which destinations the run has already handed out.
pub struct UnitConverter<E: Encoder> {
    locator: Arc<AssetLocator>,
    encoder: Arc<E>,
    profile: Mp3Profile,
    intermediate_formats: Vec<String>,
    temp_dir: Option<PathBuf>,
    /// Destination path -> source that claimed it.
    claims: Mutex<HashMap<PathBuf, PathBuf>>,
}

impl<E: Encoder + 'static> UnitConverter<E> {
    /// Creates a converter for one run.
    pub fn new(locator: Arc<AssetLocator>, encoder: Arc<E>, config: &EncoderConfig) -> Self {
        Self {
            locator,
            encoder,
            profile: config.profile(),
            intermediate_formats: config.intermediate_formats.clone(),
            temp_dir: config.temp_dir.clone(),
            claims: Mutex::new(HashMap::new()),
        }
    }

    /// Converts one unit into `output_dir`.
    ///
    /// Always returns an outcome; errors are folded into
    /// [`OutcomeStatus::Failed`] and logged with the source path.
    pub async fn convert(&self, unit: &ConversionUnit, output_dir: &Path) -> ConversionOutcome {
        let start = Instant::now();
        let status = match self.try_convert(unit, output_dir).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to convert {:?}: {}", unit.source_path, e);
                OutcomeStatus::Failed(e)
            }
        };
        ConversionOutcome::new(unit.clone(), status, start.elapsed())
    }

    async fn try_convert(
        &self,
        unit: &ConversionUnit,
        output_dir: &Path,
    ) -> Result<OutcomeStatus, ConversionError> {
        let resolved = self.resolve(unit).await?;

        let name = usable_name(&resolved.display_name).ok_or_else(|| {
            ConversionError::InvalidName {
                source_path: unit.source_path.clone(),
                raw: resolved.display_name.clone(),
            }
        })?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ConversionError::io(output_dir, e))?;

        let final_path = output_dir.join(format!("{name}.{OUTPUT_EXTENSION}"));
        self.claim(&final_path, &unit.source_path)?;

        if is_nonempty_file(&final_path).await {
            info!("Skipping existing file: {:?}", final_path);
            return Ok(OutcomeStatus::Skipped { output: final_path });
        }

        let encoded = match unit.kind {
            UnitKind::DescriptorBased => {
                self.encoder
                    .transcode(&resolved.audio_path, &final_path, &self.profile)
                    .await
            }
            UnitKind::DirectMedia => {
                self.demux_then_transcode(&resolved.audio_path, &final_path, output_dir)
                    .await
            }
        };

        if let Err(e) = encoded {
            if e.is_fatal() {
                error!("Encoder {} is no longer available: {}", self.encoder.name(), e);
            }
            discard_partial_output(&final_path).await;
            return Err(e.into());
        }

        info!(
            "Successfully converted: {:?} -> {:?}",
            resolved.audio_path, final_path
        );
        Ok(OutcomeStatus::Converted { output: final_path })
    }

    /// Runs the blocking descriptor/audio lookup off the async workers.
    async fn resolve(&self, unit: &ConversionUnit) -> Result<ResolvedUnit, ConversionError> {
        let locator = Arc::clone(&self.locator);
        let owned = unit.clone();
        let resolved = tokio::task::spawn_blocking(move || locator.resolve(&owned))
            .await
            .map_err(|e| ConversionError::Aborted(e.to_string()))??;
        Ok(resolved)
    }

    /// Reserves `destination` for `source` for the rest of the run.
    fn claim(&self, destination: &Path, source: &Path) -> Result<(), ConversionError> {
        let mut claims = self.claims.lock().unwrap_or_else(PoisonError::into_inner);
        match claims.get(destination) {
            Some(owner) if owner != source => Err(ConversionError::DestinationCollision {
                destination: destination.to_path_buf(),
                owner: owner.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                claims.insert(destination.to_path_buf(), source.to_path_buf());
                Ok(())
            }
        }
    }

    /// Demuxes the audio stream losslessly, then transcodes the intermediate.
    ///
    /// Intermediate containers are tried in configured order until a stream
    /// copy succeeds. Every intermediate is removed before returning.
    async fn demux_then_transcode(
        &self,
        source: &Path,
        final_path: &Path,
        output_dir: &Path,
    ) -> Result<(), EncodeError> {
        let temp_dir = self.temp_dir.as_deref().unwrap_or(output_dir);
        tokio::fs::create_dir_all(temp_dir).await?;

        let mut last_error = None;
        for extension in &self.intermediate_formats {
            let intermediate = tempfile::Builder::new()
                .prefix(INTERMEDIATE_PREFIX)
                .suffix(&format!(".{extension}"))
                .tempfile_in(temp_dir)?
                .into_temp_path();

            debug!(
                "Extracting audio from {:?} into {:?}",
                source,
                intermediate.to_path_buf()
            );
            let copied = self.encoder.stream_copy(source, &intermediate).await;
            let result = match copied {
                Ok(()) => {
                    self.encoder
                        .transcode(&intermediate, final_path, &self.profile)
                        .await
                }
                Err(e) => Err(e),
            };
            // A failed stream copy falls through to the next container;
            // a failed transcode is final.
            let stream_copy_failed = matches!(
                result,
                Err(EncodeError::Failed {
                    stage: EncodeStage::StreamCopy,
                    ..
                })
            );
            remove_intermediate(intermediate);

            if !stream_copy_failed {
                return result;
            }
            debug!(
                "Stream copy into .{} failed for {:?}, trying next container",
                extension, source
            );
            last_error = result.err();
        }

        Err(last_error.unwrap_or_else(|| {
            EncodeError::failed(
                EncodeStage::StreamCopy,
                None,
                "no intermediate formats configured",
            )
        }))
    }
}

async fn is_nonempty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Deletes an intermediate file; failures are logged only.
fn remove_intermediate(intermediate: TempPath) {
    let path = intermediate.to_path_buf();
    if let Err(e) = intermediate.close() {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temp file {:?}: {}", path, e);
        }
    }
}

/// Removes whatever a failed encoder run left at the destination.
async fn discard_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {:?}: {}", path, e),
    }
}
