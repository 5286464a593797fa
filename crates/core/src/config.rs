//! Dump settings and how they are loaded from disk.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dump::{DumpError, DumpResult};
use crate::runtime::{AttachOptions, DEFAULT_LIBRARY};

/// Settings for a dump run.
///
/// Read from `.json` or `.yaml`/`.yml` files; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// File name of the runtime library (used for loading and for the maps lookup).
    pub library: String,
    /// Sleep between readiness checks while the runtime initializes.
    pub poll_interval_ms: u64,
    /// Print the `// Image <i>: <name>` index ahead of the declarations.
    pub include_image_index: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            library: DEFAULT_LIBRARY.to_string(),
            poll_interval_ms: 1000,
            include_image_index: true,
        }
    }
}

impl DumpConfig {
    pub fn attach_options(&self) -> AttachOptions {
        AttachOptions {
            library: self.library.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// Load a config file, picking the format from its extension (JSON for
/// `.json`, YAML otherwise).
pub fn load_config(path: &Path) -> DumpResult<DumpConfig> {
    let config_error =
        |reason: String| DumpError::Config { path: path.to_path_buf(), reason };

    let bytes = std::fs::read(path).map_err(|e| config_error(e.to_string()))?;
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_slice(&bytes).map_err(|e| config_error(e.to_string()))
    } else {
        serde_yaml::from_slice(&bytes).map_err(|e| config_error(e.to_string()))
    }
}
