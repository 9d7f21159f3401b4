//! PhishGuard Core
//!
//! Core types and utilities shared across PhishGuard components.
//!
//! This crate provides:
//! - The feature, schema and prediction data model
//! - Error types and result handling
//! - Percentage rounding and formatting used in prediction responses

pub mod error;
pub mod types;

pub use error::{Error, Result, NO_URL_PROVIDED};
pub use types::{
    format_percentage, round_to_hundredths, AlignedVector, FeatureVector, ModelSchema,
    PredictRequest, PredictionResult, ProbabilityPair,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AlignedVector, FeatureVector, ModelSchema, PredictRequest, PredictionResult,
        ProbabilityPair,
    };
}
