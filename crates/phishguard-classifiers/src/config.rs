//! Configuration for the detector's loaded state

use crate::model_loader::ModelConfig;
use phishguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of the word corpus, model artifact and feature schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Word list, one word per line
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// Random-forest artifact (JSON)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Feature schema (JSON array); falls back to the artifact's embedded schema
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            model_path: default_model_path(),
            schema_path: None,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every path is set
    pub fn validate(&self) -> Result<()> {
        if self.corpus_path.as_os_str().is_empty() {
            return Err(Error::config("corpus_path must not be empty"));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(Error::config("model_path must not be empty"));
        }
        if matches!(&self.schema_path, Some(p) if p.as_os_str().is_empty()) {
            return Err(Error::config("schema_path must not be empty when set"));
        }
        Ok(())
    }

    /// Model loading configuration for these paths
    pub fn to_model_config(&self) -> ModelConfig {
        let config = ModelConfig::from_local(&self.model_path);
        match &self.schema_path {
            Some(schema) => config.with_schema(schema),
            None => config,
        }
    }
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("./data/words.txt")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./data/random_forest_model.json")
}
