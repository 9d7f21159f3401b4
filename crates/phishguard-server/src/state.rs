//! Shared application state

use crate::config::{ServerSettings, ServiceConfig};
use phishguard_classifiers::PhishingDetector;
use phishguard_core::Result;
use phishguard_telemetry::MetricsCollector;
use std::sync::Arc;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded corpus, extractor and model; read-only after startup
    pub detector: Arc<PhishingDetector>,

    /// Request and prediction counters
    pub metrics: MetricsCollector,

    pub settings: ServerSettings,
}

impl AppState {
    pub fn new(detector: Arc<PhishingDetector>, settings: ServerSettings) -> Self {
        Self {
            detector,
            metrics: MetricsCollector::new(),
            settings,
        }
    }

    /// Load the detector described by `config`.
    ///
    /// Fails when the corpus, model or schema cannot be loaded; the service
    /// must not start serving in that case.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let detector = PhishingDetector::from_config(&config.detector)?;
        Ok(Self::new(Arc::new(detector), config.server))
    }
}
