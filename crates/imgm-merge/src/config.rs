use std::path::Path;

use serde::{Deserialize, Serialize};

use imgm_scan::{SectorClassifier, DEFAULT_SUSPECT_RUN_THRESHOLD};

use crate::error::{MergeError, MergeResult};

/// Sectors between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 256;

/// Tunables for a merge run.
///
/// Loaded from TOML; missing keys take their defaults:
///
/// ```toml
/// progress_interval = 256
/// suspect_run_threshold = 16
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Progress is reported whenever `sector % progress_interval == 0`.
    pub progress_interval: u64,
    /// Tail runs longer than this mark a block as suspect.
    pub suspect_run_threshold: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            suspect_run_threshold: DEFAULT_SUSPECT_RUN_THRESHOLD,
        }
    }
}

impl MergeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> MergeResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MergeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> MergeResult<()> {
        if self.progress_interval == 0 {
            return Err(MergeError::Config(
                "progress_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The classifier these settings describe.
    pub fn classifier(&self) -> SectorClassifier {
        SectorClassifier::new(self.suspect_run_threshold)
    }
}
