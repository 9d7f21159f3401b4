//! Model artifact and feature schema loading

use crate::classifier::Classifier;
use crate::forest::{RandomForest, TreeArtifact};
use phishguard_core::{Error, ModelSchema, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Artifact format version this loader understands
pub const FORMAT_VERSION: u32 = 1;

/// Configuration for loading a model artifact
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Source of the model
    pub source: ModelSource,

    /// Separate feature schema file, overriding any embedded schema
    pub schema_path: Option<PathBuf>,
}

/// Source location for the model artifact
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Artifact JSON already in memory
    Inline(String),
}

impl ModelConfig {
    /// Create a new model configuration from local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::LocalPath(path.into()),
            schema_path: None,
        }
    }

    /// Create a new model configuration from artifact JSON
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            source: ModelSource::Inline(json.into()),
            schema_path: None,
        }
    }

    /// Set schema path
    pub fn with_schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }
}

/// On-disk model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_format_version")]
    pub format_version: u32,

    #[serde(default = "default_model_type")]
    pub model_type: String,

    /// Class labels in probability-column order
    #[serde(default = "default_classes")]
    pub classes: Vec<serde_json::Value>,

    /// Embedded feature schema
    #[serde(default)]
    pub feature_columns: Option<ModelSchema>,

    pub trees: Vec<TreeArtifact>,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

fn default_model_type() -> String {
    "random_forest".to_string()
}

fn default_classes() -> Vec<serde_json::Value> {
    vec![0.into(), 1.into()]
}

/// Model metadata
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model type from the artifact
    pub model_type: String,

    /// Number of trees in the ensemble
    pub tree_count: usize,

    /// Number of input features
    pub n_features: usize,
}

/// Loaded classifier together with the schema it was trained on
pub struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    schema: ModelSchema,
    metadata: ModelMetadata,
}

impl LoadedModel {
    /// Load a model from configuration
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let (json, name) = match &config.source {
            ModelSource::LocalPath(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    Error::model(format!(
                        "failed to read model artifact {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                (json, model_name(path))
            }
            ModelSource::Inline(json) => (json.clone(), "inline".to_string()),
        };

        let artifact: ModelArtifact = serde_json::from_str(&json)
            .map_err(|e| Error::model(format!("corrupt model artifact {}: {}", name, e)))?;

        let schema = match &config.schema_path {
            Some(path) => Some(load_schema(path)?),
            None => None,
        };

        Self::from_artifact(name, artifact, schema)
    }

    /// Build a model from a parsed artifact.
    ///
    /// `schema` takes precedence over the artifact's embedded schema.
    pub fn from_artifact(
        name: impl Into<String>,
        artifact: ModelArtifact,
        schema: Option<ModelSchema>,
    ) -> Result<Self> {
        let name = name.into();

        if artifact.format_version != FORMAT_VERSION {
            return Err(Error::model(format!(
                "unsupported artifact format version {} (expected {})",
                artifact.format_version, FORMAT_VERSION
            )));
        }
        if artifact.model_type != "random_forest" {
            return Err(Error::model(format!(
                "unsupported model type '{}'",
                artifact.model_type
            )));
        }
        if artifact.classes.len() != 2 {
            return Err(Error::model(format!(
                "expected a binary classifier, artifact lists {} classes",
                artifact.classes.len()
            )));
        }

        let schema = schema
            .or(artifact.feature_columns)
            .ok_or_else(|| Error::model(format!("no feature schema available for {}", name)))?;

        let forest = RandomForest::from_artifacts(name.clone(), &artifact.trees, schema.len())?;

        let metadata = ModelMetadata {
            name,
            model_type: artifact.model_type,
            tree_count: forest.tree_count(),
            n_features: schema.len(),
        };

        info!(
            "Loaded {} model '{}' with {} trees over {} features",
            metadata.model_type, metadata.name, metadata.tree_count, metadata.n_features
        );

        Ok(Self {
            classifier: Arc::new(forest),
            schema,
            metadata,
        })
    }

    /// Get model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Split into classifier and schema
    pub fn into_parts(self) -> (Arc<dyn Classifier>, ModelSchema) {
        (self.classifier, self.schema)
    }
}

/// Load a feature schema: a JSON array of feature names
pub fn load_schema(path: impl AsRef<Path>) -> Result<ModelSchema> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::model(format!(
            "failed to read feature schema {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::model(format!("corrupt feature schema {}: {}", path.display(), e)))
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
