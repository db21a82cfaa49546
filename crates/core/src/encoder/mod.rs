//! External encoder boundary.
//!
//! The pipeline treats the encoder as an opaque command: it takes an input
//! path and an output path and either succeeds or fails with diagnostic text.
//! [`FfmpegEncoder`] drives an `ffmpeg` binary through `tokio::process`.
//!
//! # Example
//!
//! ```ignore
//! use mp3batch_core::encoder::{Encoder, EncoderConfig, FfmpegEncoder, Mp3Profile};
//!
//! let encoder = FfmpegEncoder::new(EncoderConfig::default());
//! encoder.validate().await?;
//! encoder
//!     .transcode(Path::new("audio.m4a"), Path::new("out/Title.mp3"), &Mp3Profile::default())
//!     .await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncodeError;
pub use ffmpeg::FfmpegEncoder;
pub use traits::Encoder;
pub use types::{EncodeStage, Mp3Profile, MAX_VBR_QUALITY};
