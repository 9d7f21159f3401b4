//! Core types for PhishGuard

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered mapping from feature name to numeric value.
///
/// Insertion order is preserved. Inserting a name that is already present
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// Create an empty feature vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty feature vector with room for `capacity` features
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set a feature value
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Set a boolean feature, stored as 1.0 or 0.0
    pub fn insert_flag(&mut self, name: impl Into<String>, flag: bool) {
        self.insert(name, if flag { 1.0 } else { 0.0 });
    }

    /// Get a feature value by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Feature names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector holds no features
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut vector = Self::new();
        for (name, value) in iter {
            vector.insert(name, value);
        }
        vector
    }
}

/// Ordered list of feature names a model was trained on.
///
/// Never empty and never contains the same name twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ModelSchema {
    names: Vec<String>,
}

impl ModelSchema {
    /// Create a schema, rejecting empty or duplicated name lists
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::model("feature schema is empty"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::model(format!(
                    "feature schema lists '{}' more than once",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    /// Feature names in model order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of features the model expects
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the schema lists no features
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Project a feature vector onto this schema.
    ///
    /// Names missing from `features` become 0.0 and names the schema does
    /// not list are dropped, so the result always has `self.len()` values.
    pub fn align(&self, features: &FeatureVector) -> AlignedVector {
        let values = self
            .names
            .iter()
            .map(|name| features.get(name).unwrap_or(0.0))
            .collect();

        AlignedVector { values }
    }
}

impl TryFrom<Vec<String>> for ModelSchema {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<ModelSchema> for Vec<String> {
    fn from(schema: ModelSchema) -> Self {
        schema.names
    }
}

/// A feature vector projected onto a [`ModelSchema`], in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    values: Vec<f64>,
}

impl AlignedVector {
    /// Values in schema order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Two-class probability output: `[P(unsafe), P(safe)]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPair {
    /// Probability of class 0 (phishing)
    pub unsafe_probability: f64,

    /// Probability of class 1 (legitimate)
    pub safe_probability: f64,
}

impl ProbabilityPair {
    const TOLERANCE: f64 = 1e-6;

    /// Create a probability pair
    pub fn new(unsafe_probability: f64, safe_probability: f64) -> Self {
        Self {
            unsafe_probability,
            safe_probability,
        }
    }

    /// Check that both values are finite probabilities summing to one
    pub fn validate(&self) -> Result<()> {
        for (label, p) in [
            ("unsafe", self.unsafe_probability),
            ("safe", self.safe_probability),
        ] {
            if !p.is_finite() || p < -Self::TOLERANCE || p > 1.0 + Self::TOLERANCE {
                return Err(Error::computation(format!(
                    "{} probability {} is outside [0, 1]",
                    label, p
                )));
            }
        }

        let sum = self.unsafe_probability + self.safe_probability;
        if (sum - 1.0).abs() > Self::TOLERANCE {
            return Err(Error::computation(format!(
                "class probabilities sum to {} instead of 1",
                sum
            )));
        }

        Ok(())
    }

    /// Whether the classifier leans towards phishing
    pub fn is_unsafe(&self) -> bool {
        self.unsafe_probability > self.safe_probability
    }
}

/// Incoming prediction request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Raw URL supplied by the caller
    #[serde(default)]
    pub url: Option<String>,
}

/// Formatted outcome of a single prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// The URL that was scored, trimmed of surrounding whitespace
    pub url: String,

    /// `P(safe)` as a percentage string, e.g. `"87.5%"`
    pub safety_percentage: String,

    /// `P(unsafe)` as a percentage string, e.g. `"12.5%"`
    pub unsafe_percentage: String,
}

impl PredictionResult {
    /// Build the response for a scored URL
    pub fn from_probabilities(url: impl Into<String>, probabilities: &ProbabilityPair) -> Self {
        let safety = round_to_hundredths(probabilities.safe_probability * 100.0);
        let unsafe_ = round_to_hundredths(probabilities.unsafe_probability * 100.0);

        Self {
            url: url.into(),
            safety_percentage: format_percentage(safety),
            unsafe_percentage: format_percentage(unsafe_),
        }
    }

    /// Numeric value of `safety_percentage`
    pub fn safety_value(&self) -> Option<f64> {
        parse_percentage(&self.safety_percentage)
    }

    /// Numeric value of `unsafe_percentage`
    pub fn unsafe_value(&self) -> Option<f64> {
        parse_percentage(&self.unsafe_percentage)
    }
}

/// Round to two decimal places, ties resolved on the exact binary value
/// (half-to-even when the value is exactly halfway).
pub fn round_to_hundredths(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Shortest round-trip rendering of `value` followed by `%`.
///
/// Whole numbers keep a trailing `.0` (`100.0%`).
pub fn format_percentage(value: f64) -> String {
    format!("{:?}%", value)
}

fn parse_percentage(text: &str) -> Option<f64> {
    text.strip_suffix('%')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schema(names: &[&str]) -> ModelSchema {
        ModelSchema::new(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_feature_vector_preserves_order_and_replaces() {
        let mut features = FeatureVector::new();
        features.insert("b", 1.0);
        features.insert("a", 2.0);
        features.insert("b", 3.0);

        assert_eq!(features.len(), 2);
        assert_eq!(features.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(features.get("b"), Some(3.0));
        assert_eq!(features.get("c"), None);
    }

    #[test]
    fn test_insert_flag() {
        let mut features = FeatureVector::new();
        features.insert_flag("yes", true);
        features.insert_flag("no", false);
        assert_eq!(features.get("yes"), Some(1.0));
        assert_eq!(features.get("no"), Some(0.0));
    }

    #[test]
    fn test_schema_rejects_empty_and_duplicates() {
        assert!(ModelSchema::new(vec![]).is_err());
        assert!(ModelSchema::new(vec!["a".into(), "a".into()]).is_err());
    }

    #[test]
    fn test_schema_deserializes_from_array() {
        let schema: ModelSchema = serde_json::from_str(r#"["url_length", "num_dots"]"#).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.names(), ["url_length", "num_dots"]);

        let dup: std::result::Result<ModelSchema, _> = serde_json::from_str(r#"["a", "a"]"#);
        assert!(dup.is_err());
    }

    #[test]
    fn test_align_fills_missing_and_drops_extra() {
        let schema = schema(&["a", "b", "c"]);
        let features: FeatureVector = vec![("c", 3.0), ("extra", 9.0), ("a", 1.0)]
            .into_iter()
            .collect();

        let aligned = schema.align(&features);
        assert_eq!(aligned.as_slice().len(), schema.len());
        assert_eq!(aligned.as_slice(), &[1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_probability_pair_validation() {
        assert!(ProbabilityPair::new(0.25, 0.75).validate().is_ok());
        assert!(ProbabilityPair::new(0.5, 0.6).validate().is_err());
        assert!(ProbabilityPair::new(f64::NAN, 1.0).validate().is_err());
        assert!(ProbabilityPair::new(-0.5, 1.5).validate().is_err());
        assert!(ProbabilityPair::new(0.7, 0.3).is_unsafe());
    }

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(format_percentage(round_to_hundredths(87.5)), "87.5%");
        assert_eq!(format_percentage(round_to_hundredths(100.0)), "100.0%");
        assert_eq!(format_percentage(round_to_hundredths(0.0)), "0.0%");
        assert_eq!(format_percentage(round_to_hundredths(33.333333)), "33.33%");
        assert_eq!(format_percentage(round_to_hundredths(66.666666)), "66.67%");
        // 2.675 is stored just below the halfway point
        assert_eq!(round_to_hundredths(2.675), 2.67);
    }

    #[test]
    fn test_prediction_result_from_probabilities() {
        let result =
            PredictionResult::from_probabilities("http://example.com/", &ProbabilityPair::new(0.125, 0.875));

        assert_eq!(result.url, "http://example.com/");
        assert_eq!(result.safety_percentage, "87.5%");
        assert_eq!(result.unsafe_percentage, "12.5%");
        assert_eq!(result.safety_value(), Some(87.5));
    }

    #[test]
    fn test_predict_request_missing_url() {
        let req: PredictRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_none());

        let req: PredictRequest = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert!(req.url.is_none());
    }

    proptest! {
        #[test]
        fn prop_percentages_sum_to_hundred(p in 0.0f64..=1.0) {
            let result = PredictionResult::from_probabilities("u", &ProbabilityPair::new(p, 1.0 - p));
            let total = result.safety_value().unwrap() + result.unsafe_value().unwrap();
            prop_assert!((total - 100.0).abs() <= 0.01 + 1e-9, "total was {}", total);
        }

        #[test]
        fn prop_aligned_length_matches_schema(extra in proptest::collection::vec("[a-z]{1,8}", 0..10)) {
            let schema = schema(&["url_length", "num_dots", "num_at"]);
            let features: FeatureVector = extra.iter().map(|n| (n.clone(), 1.0)).collect();
            prop_assert_eq!(schema.align(&features).as_slice().len(), schema.len());
        }
    }
}
