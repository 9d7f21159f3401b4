//! Inference pipeline: schema alignment followed by scoring

use crate::classifier::Classifier;
use crate::model_loader::LoadedModel;
use phishguard_core::{AlignedVector, Error, FeatureVector, ModelSchema, ProbabilityPair, Result};
use std::sync::Arc;
use tracing::debug;

/// Holds a classifier and the schema its inputs must follow.
///
/// Immutable after construction; `score` can be called from any number of
/// threads at once.
#[derive(Clone)]
pub struct InferencePipeline {
    classifier: Arc<dyn Classifier>,
    schema: ModelSchema,
}

impl InferencePipeline {
    /// Create a pipeline, checking that the classifier accepts the schema's width
    pub fn new(classifier: Arc<dyn Classifier>, schema: ModelSchema) -> Result<Self> {
        if classifier.n_features() != schema.len() {
            return Err(Error::model(format!(
                "classifier '{}' expects {} features but the schema lists {}",
                classifier.name(),
                classifier.n_features(),
                schema.len()
            )));
        }

        Ok(Self { classifier, schema })
    }

    /// Create a pipeline from a loaded model artifact
    pub fn from_loaded(model: LoadedModel) -> Result<Self> {
        let (classifier, schema) = model.into_parts();
        Self::new(classifier, schema)
    }

    /// Project `features` onto the model schema
    pub fn align(&self, features: &FeatureVector) -> AlignedVector {
        self.schema.align(features)
    }

    /// Align `features` and score them, returning `[P(unsafe), P(safe)]`
    pub fn score(&self, features: &FeatureVector) -> Result<ProbabilityPair> {
        let aligned = self.align(features);

        let probabilities = self
            .classifier
            .predict_proba(aligned.as_slice())
            .map_err(|e| match e {
                Error::Computation(_) => e,
                other => Error::computation(other.to_string()),
            })?;
        probabilities.validate()?;

        debug!(
            classifier = self.classifier.name(),
            p_unsafe = probabilities.unsafe_probability,
            p_safe = probabilities.safe_probability,
            "Scored feature vector"
        );

        Ok(probabilities)
    }

    /// Get the feature schema
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Get the classifier name
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}
