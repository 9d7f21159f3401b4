//! Metrics collection and reporting

use crate::names;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Metrics collector for the prediction service
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    total_requests: AtomicU64,
    predictions: AtomicU64,
    unsafe_predictions: AtomicU64,
    rejections: AtomicU64,
    errors: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_requests: AtomicU64::new(0),
                predictions: AtomicU64::new(0),
                unsafe_predictions: AtomicU64::new(0),
                rejections: AtomicU64::new(0),
                errors: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record an incoming request
    pub fn record_request(&self) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!(names::REQUESTS_TOTAL).increment(1);
    }

    /// Record a completed prediction and whether it leaned phishing
    pub fn record_prediction(&self, is_unsafe: bool, latency_us: u64) {
        self.inner.predictions.fetch_add(1, Ordering::Relaxed);
        if is_unsafe {
            self.inner.unsafe_predictions.fetch_add(1, Ordering::Relaxed);
        }
        self.record_latency(latency_us);

        let verdict = if is_unsafe { "unsafe" } else { "safe" };
        ::metrics::counter!(names::PREDICTIONS_TOTAL, "verdict" => verdict).increment(1);
    }

    /// Record a request rejected for bad input
    pub fn record_rejection(&self) {
        self.inner.rejections.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!(names::ERRORS_TOTAL, "kind" => "validation").increment(1);
    }

    /// Record a failed prediction, labelled by error kind
    pub fn record_error(&self, kind: &'static str) {
        self.inner.errors.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!(names::ERRORS_TOTAL, "kind" => kind).increment(1);
        trace!(kind, "Recorded prediction error");
    }

    /// Record latency
    pub fn record_latency(&self, latency_us: u64) {
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        ::metrics::histogram!(names::PREDICT_LATENCY_US).record(latency_us as f64);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            predictions: self.inner.predictions.load(Ordering::Relaxed),
            unsafe_predictions: self.inner.unsafe_predictions.load(Ordering::Relaxed),
            rejections: self.inner.rejections.load(Ordering::Relaxed),
            errors: self.inner.errors.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub predictions: u64,
    pub unsafe_predictions: u64,
    pub rejections: u64,
    pub errors: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average latency per completed prediction
    pub fn avg_latency_us(&self) -> u64 {
        if self.predictions == 0 {
            0
        } else {
            self.total_latency_us / self.predictions
        }
    }

    /// Share of predictions that leaned phishing
    pub fn unsafe_rate(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            self.unsafe_predictions as f64 / self.predictions as f64
        }
    }

    /// Share of requests that ended in a rejection or error
    pub fn failure_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.rejections + self.errors) as f64 / self.total_requests as f64
        }
    }
}
