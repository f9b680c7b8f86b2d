//! Engine configuration.
//!
//! Groups the per-component builders into one serde document so a host
//! can keep its tuning in a JSON file. Missing keys fall back to the
//! defaults, so `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "blur": { "sharp_threshold": 180.0, "blurry_threshold": 60.0 },
//!   "feature_print": { "descriptor": "gray-thumbnail" },
//!   "batch": { "threads": 4 }
//! }
//! ```

use crate::core::batch::{BatchConfig, BatchCoordinator};
use crate::core::blur::{BlurConfig, BlurScorer};
use crate::core::feature_print::FeaturePrintConfig;
use crate::error::{PhotoVisionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub blur: BlurConfig,
    pub feature_print: FeaturePrintConfig,
    pub batch: BatchConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PhotoVisionError::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| PhotoVisionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.blur.validate()?;
        if self.batch.threads == Some(0) {
            return Err(PhotoVisionError::Config(
                "batch thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scorer(&self) -> Result<BlurScorer> {
        self.blur.build()
    }

    pub fn coordinator(&self) -> Result<BatchCoordinator> {
        BatchCoordinator::builder()
            .scorer(self.scorer()?)
            .config(self.batch)
            .build()
    }
}
