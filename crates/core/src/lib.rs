pub mod batch;
pub mod config;
pub mod converter;
pub mod discovery;
pub mod encoder;
pub mod sanitize;
pub mod testing;

pub use batch::{BatchError, BatchProgress, BatchResult, BatchScheduler, NullSink, ProgressSink};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
};
pub use converter::{ConversionError, ConversionOutcome, OutcomeStatus};
pub use discovery::{ConversionUnit, DiscoveryMode, UnitKind};
pub use encoder::{EncodeError, Encoder, FfmpegEncoder};
