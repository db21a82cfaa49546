use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::discovery::DiscoveryConfig;
use crate::encoder::EncoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}
