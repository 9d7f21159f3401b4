//! PhishGuard Telemetry
//!
//! Counters for the prediction service.
//!
//! [`MetricsCollector`] keeps in-process totals readable through
//! [`MetricsSnapshot`] and mirrors every event to the `metrics` facade, so an
//! installed recorder (such as the Prometheus exporter) sees the same numbers.

pub mod metrics;

pub use crate::metrics::{MetricsCollector, MetricsSnapshot};

/// Metric names emitted through the `metrics` facade
pub mod names {
    pub const REQUESTS_TOTAL: &str = "phishguard_requests_total";
    pub const PREDICTIONS_TOTAL: &str = "phishguard_predictions_total";
    pub const ERRORS_TOTAL: &str = "phishguard_errors_total";
    pub const PREDICT_LATENCY_US: &str = "phishguard_predict_latency_us";
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
