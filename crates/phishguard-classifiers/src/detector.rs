//! Prediction orchestration over the immutable detector context

use crate::classifier::Prediction;
use crate::config::DetectorConfig;
use crate::corpus::WordCorpus;
use crate::features::FeatureExtractor;
use crate::model_loader::LoadedModel;
use crate::pipeline::InferencePipeline;
use phishguard_core::{Error, PredictionResult, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Everything needed to score a URL, loaded once at startup.
///
/// Shared read-only (typically behind an `Arc`) by all request handlers.
pub struct PhishingDetector {
    extractor: FeatureExtractor,
    pipeline: InferencePipeline,
}

impl PhishingDetector {
    /// Create a detector from already-built components
    pub fn new(extractor: FeatureExtractor, pipeline: InferencePipeline) -> Self {
        Self {
            extractor,
            pipeline,
        }
    }

    /// Load corpus, model and schema from disk.
    ///
    /// Any failure here must stop the service from starting.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading word corpus from {}", config.corpus_path.display());
        let corpus = WordCorpus::load(&config.corpus_path)?;

        info!("Loading model artifact from {}", config.model_path.display());
        let model = LoadedModel::load(&config.to_model_config())?;
        let metadata = model.metadata().clone();
        let pipeline = InferencePipeline::from_loaded(model)?;

        let extractor = FeatureExtractor::new(Arc::new(corpus))?;

        info!(
            model = %metadata.name,
            trees = metadata.tree_count,
            corpus_words = extractor.corpus().len(),
            schema_features = pipeline.schema().len(),
            "Detector ready"
        );

        Ok(Self::new(extractor, pipeline))
    }

    /// Score a caller-supplied URL.
    ///
    /// The URL is trimmed of surrounding whitespace and the ASCII
    /// separator controls; `None` or a blank string is a validation error.
    pub fn predict(&self, url: Option<&str>) -> Result<Prediction> {
        let url = url
            .map(trim_url)
            .filter(|u| !u.is_empty())
            .ok_or_else(Error::no_url)?;

        let start = Instant::now();

        let features = self.extractor.extract(url);
        debug!(?features, "Extracted URL features");

        let probabilities = self.pipeline.score(&features)?;
        let result = PredictionResult::from_probabilities(url, &probabilities);

        Ok(Prediction {
            result,
            probabilities,
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    /// Get the inference pipeline
    pub fn pipeline(&self) -> &InferencePipeline {
        &self.pipeline
    }
}

/// Strip whitespace and the information separators U+001C..=U+001F
fn trim_url(url: &str) -> &str {
    url.trim_matches(|c: char| c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c))
}
