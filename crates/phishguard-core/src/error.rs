//! Error types for PhishGuard

/// Result type alias using PhishGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned when a request carries no usable URL
pub const NO_URL_PROVIDED: &str = "No URL provided";

/// Core error type for PhishGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller input was missing or unusable
    #[error("{0}")]
    Validation(String),

    /// Feature extraction, schema alignment or scoring failed
    #[error("{0}")]
    Computation(String),

    /// Word corpus could not be loaded
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Model artifact or schema could not be loaded
    #[error("model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The validation error for an absent or blank URL
    pub fn no_url() -> Self {
        Self::Validation(NO_URL_PROVIDED.to_string())
    }

    /// Create a new computation error
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Create a new corpus error
    pub fn corpus(msg: impl Into<String>) -> Self {
        Self::Corpus(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Computation(_) => "computation",
            Self::Corpus(_) => "corpus",
            Self::Model(_) => "model",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Yaml(_) => "yaml",
            Self::Internal(_) => "internal",
        }
    }
}
