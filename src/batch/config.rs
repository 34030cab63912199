//! Batch evaluation description.
//!
//! A batch lists groups of recordings captured at one reference bearing each:
//!
//! ```toml
//! data_dir = "data"
//!
//! [aggregation]
//! wrap_policy = { kind = "circular" }
//!
//! [[group]]
//! label = "60deg"
//! reference_deg = 60.0
//! files = ["60_1.bin", "60_2.bin"]
//!
//! [[group]]
//! label = "330deg"
//! reference_deg = 330.0
//! files = ["330_1.bin", "330_2.bin"]
//! ```
//!
//! An `[estimator]` table with the same layout as the standalone estimator
//! configuration may be embedded. Relative `data_dir` values resolve against
//! the directory of the batch file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::batch::WrapPolicy;
use crate::config::EstimatorConfig;
use crate::error::{AoaError, Result};

/// Recordings captured at one reference bearing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleGroup {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_deg: Option<f64>,
    pub files: Vec<PathBuf>,
}

/// Aggregation settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub wrap_policy: WrapPolicy,
}

/// Complete batch description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory the group file names are relative to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub estimator: EstimatorConfig,
    pub aggregation: AggregationConfig,
    #[serde(rename = "group")]
    pub groups: Vec<AngleGroup>,
}

impl BatchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AoaError::Config(e.to_string()))
    }

    /// Load a batch file, resolving a relative `data_dir` against its location
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.data_dir = Some(match config.data_dir.take() {
            Some(dir) if dir.is_relative() => base.join(dir),
            Some(dir) => dir,
            None => base.to_path_buf(),
        });

        log::debug!(
            "Loaded batch {} with {} groups",
            path.display(),
            config.groups.len()
        );
        Ok(config)
    }

    /// Groups with every file path joined onto `data_dir`
    pub fn resolved_groups(&self) -> Vec<AngleGroup> {
        let Some(dir) = &self.data_dir else {
            return self.groups.clone();
        };
        self.groups
            .iter()
            .map(|g| AngleGroup {
                label: g.label.clone(),
                reference_deg: g.reference_deg,
                files: g.files.iter().map(|f| dir.join(f)).collect(),
            })
            .collect()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AoaError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"
        data_dir = "data"

        [estimator.conditioning]
        upsample_factor = 8

        [aggregation]
        wrap_policy = { kind = "unwrap", threshold_deg = 180.0 }

        [[group]]
        label = "40deg"
        reference_deg = 40.0
        files = ["0_1.bin", "0_2.bin"]

        [[group]]
        label = "unlabeled"
        files = ["x.bin"]
    "#;

    #[test]
    fn test_parse_batch() {
        let config = BatchConfig::from_toml_str(BATCH).unwrap();
        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[0].reference_deg, Some(40.0));
        assert_eq!(config.groups[1].reference_deg, None);
        assert_eq!(config.estimator.conditioning.upsample_factor, 8);
        assert_eq!(config.estimator.filter.order, 9);
        assert_eq!(
            config.aggregation.wrap_policy,
            WrapPolicy::Unwrap {
                threshold_deg: 180.0
            }
        );
    }

    #[test]
    fn test_resolved_paths() {
        let config = BatchConfig::from_toml_str(BATCH).unwrap();
        let groups = config.resolved_groups();
        assert_eq!(groups[0].files[1], PathBuf::from("data/0_2.bin"));
    }

    #[test]
    fn test_load_resolves_against_batch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        fs::write(&path, BATCH).unwrap();

        let config = BatchConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, Some(dir.path().join("data")));
        assert_eq!(
            config.resolved_groups()[1].files[0],
            dir.path().join("data").join("x.bin")
        );
    }

    #[test]
    fn test_round_trip() {
        let config = BatchConfig::from_toml_str(BATCH).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(BatchConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_empty_batch_uses_defaults() {
        let config = BatchConfig::from_toml_str("").unwrap();
        assert!(config.groups.is_empty());
        assert_eq!(config.aggregation.wrap_policy, WrapPolicy::Circular);
    }
}
