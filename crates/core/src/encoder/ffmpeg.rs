//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::config::EncoderConfig;
use super::error::EncodeError;
use super::traits::Encoder;
use super::types::{EncodeStage, Mp3Profile};

/// FFmpeg-based encoder implementation.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Leading arguments shared by every invocation.
    fn input_args(&self, input_path: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-hide_banner"),
            OsString::from("-loglevel"),
            OsString::from(&self.config.log_level),
            OsString::from("-i"),
            input_path.as_os_str().to_os_string(),
        ]
    }

    /// Closes an argument list with extra args and the output path.
    fn finish_args(&self, mut args: Vec<OsString>, output_path: &Path) -> Vec<OsString> {
        args.extend(self.config.extra_args.iter().map(OsString::from));
        args.push(OsString::from("-y"));
        args.push(output_path.as_os_str().to_os_string());
        args
    }

    /// Builds ffmpeg arguments for an MP3 transcode.
    fn build_transcode_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        profile: &Mp3Profile,
    ) -> Vec<OsString> {
        let mut args = self.input_args(input_path);
        args.extend([
            OsString::from("-vn"),
            OsString::from("-c:a"),
            OsString::from("libmp3lame"),
            OsString::from("-q:a"),
            OsString::from(profile.vbr_quality.to_string()),
        ]);
        self.finish_args(args, output_path)
    }

    /// Builds ffmpeg arguments for a lossless audio demux.
    fn build_stream_copy_args(&self, input_path: &Path, output_path: &Path) -> Vec<OsString> {
        let mut args = self.input_args(input_path);
        args.extend([OsString::from("-vn"), OsString::from("-c:a"), OsString::from("copy")]);
        self.finish_args(args, output_path)
    }

    fn map_spawn_error(&self, e: std::io::Error) -> EncodeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            EncodeError::EncoderNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            EncodeError::Io(e)
        }
    }

    /// Runs ffmpeg to completion, capturing stderr.
    async fn run(&self, stage: EncodeStage, args: &[OsString]) -> Result<(), EncodeError> {
        let start = Instant::now();
        debug!(stage = %stage, "Running {:?} {:?}", self.config.ffmpeg_path, args);

        let output = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EncodeError::failed(stage, output.status.code(), stderr));
        }

        debug!(
            stage = %stage,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ffmpeg finished"
        );
        Ok(())
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn validate(&self) -> Result<(), EncodeError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(EncodeError::failed(
                EncodeStage::Probe,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(())
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        profile: &Mp3Profile,
    ) -> Result<(), EncodeError> {
        let args = self.build_transcode_args(input, output, profile);
        self.run(EncodeStage::Transcode, &args).await
    }

    async fn stream_copy(&self, input: &Path, output: &Path) -> Result<(), EncodeError> {
        let args = self.build_stream_copy_args(input, output);
        self.run(EncodeStage::StreamCopy, &args).await
    }
}
