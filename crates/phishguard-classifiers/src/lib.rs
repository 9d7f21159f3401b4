//! PhishGuard Classifiers
//!
//! URL feature extraction and phishing classification.
//!
//! A URL flows through three stages:
//! - [`FeatureExtractor`] turns the raw string into a fixed set of lexical features
//! - [`InferencePipeline`] aligns those features to the model schema and scores them
//! - [`PhishingDetector`] validates input and formats the probabilities as percentages
//!
//! All state is loaded once and immutable afterwards, so a single detector can
//! be shared across threads without locking.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod detector;
pub mod features;
pub mod forest;
pub mod model_loader;
pub mod patterns;
pub mod pipeline;

pub use classifier::{Classifier, Prediction};
pub use config::DetectorConfig;
pub use corpus::WordCorpus;
pub use detector::PhishingDetector;
pub use features::{FeatureExtractor, FEATURE_COUNT, FEATURE_NAMES};
pub use forest::{DecisionTree, RandomForest, TreeArtifact};
pub use model_loader::{load_schema, LoadedModel, ModelArtifact, ModelConfig, ModelSource};
pub use pipeline::InferencePipeline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, Prediction};
    pub use crate::detector::PhishingDetector;
    pub use crate::features::FeatureExtractor;
    pub use crate::model_loader::{LoadedModel, ModelConfig};
    pub use crate::pipeline::InferencePipeline;
}
