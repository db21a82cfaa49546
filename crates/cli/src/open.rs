//! Opening the output folder in the platform file manager.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &str = "xdg-open";

/// Launches the file manager on `dir`. Failure is only logged.
pub fn open_folder(dir: &Path) {
    let spawned = Command::new(OPENER)
        .arg(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    match spawned {
        Ok(_) => debug!("Opened {:?} with {}", dir, OPENER),
        Err(e) => warn!("Could not open {:?} with {}: {}", dir, OPENER, e),
    }
}
