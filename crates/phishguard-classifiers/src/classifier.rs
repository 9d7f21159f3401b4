//! Classifier trait and common types

use phishguard_core::{ProbabilityPair, Result};

/// Trait for all two-class probabilistic classifiers.
///
/// Implementations must be pure with respect to `predict_proba`: the same
/// input always yields the same output and no internal state changes, so a
/// single instance can serve concurrent requests.
pub trait Classifier: Send + Sync {
    /// Score one aligned feature row, returning `[P(unsafe), P(safe)]`
    fn predict_proba(&self, features: &[f64]) -> Result<ProbabilityPair>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Number of input features the classifier expects
    fn n_features(&self) -> usize;
}

/// Scored URL with the raw probabilities behind its formatted result
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Response payload
    pub result: phishguard_core::PredictionResult,

    /// Probabilities as returned by the classifier
    pub probabilities: ProbabilityPair,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Prediction {
    /// Whether the classifier leans towards phishing
    pub fn is_unsafe(&self) -> bool {
        self.probabilities.is_unsafe()
    }
}
