//! Asset discovery over input trees.
//!
//! Two conventions are supported:
//! - descriptor-based trees, where a JSON sidecar (`entry.json` by default)
//!   names the title and an audio stream lives next to it or a couple of
//!   levels below;
//! - direct-media trees, where every video/container file is its own unit.
//!
//! An [`AssetLocator`] memoizes audio lookups and descriptor titles for the
//! lifetime of one batch run. Create a fresh locator per run.

mod config;
mod error;
mod locator;
mod types;

pub use config::DiscoveryConfig;
pub use error::DiscoveryError;
pub use locator::AssetLocator;
pub use types::{ConversionUnit, DiscoveryMode, ResolvedUnit, UnitKind};
