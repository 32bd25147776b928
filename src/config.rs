//! Pipeline configuration, optionally loaded from a TOML file

use crate::attributes::{ID_COLUMN, LABEL_COLUMN};
use crate::model::ClassifierKind;
use crate::schema::ReferencePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings shared by the `train` and `inspect` commands.
///
/// Defaults reproduce the reference churn notebook: 80/20 split with seed 42,
/// logistic regression with 1000 iterations, no scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub target: String,
    pub drop_columns: Vec<String>,
    pub reference_policy: ReferencePolicy,
    /// Attribute name to pinned reference category
    pub reference_overrides: BTreeMap<String, String>,
    pub test_ratio: f64,
    pub seed: u64,
    pub classifier: ClassifierKind,
    pub max_iterations: u64,
    pub max_depth: Option<usize>,
    pub scale: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target: LABEL_COLUMN.to_string(),
            drop_columns: vec![ID_COLUMN.to_string()],
            reference_policy: ReferencePolicy::First,
            reference_overrides: BTreeMap::new(),
            test_ratio: 0.2,
            seed: 42,
            classifier: ClassifierKind::Logistic,
            max_iterations: 1000,
            max_depth: Some(8),
            scale: false,
        }
    }
}

impl PipelineConfig {
    /// Load from `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }
}
