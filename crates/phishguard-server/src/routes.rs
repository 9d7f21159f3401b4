//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, error, info, info_span, warn};

use crate::state::AppState;
use phishguard_core::{Error, PredictRequest, PredictionResult};
use phishguard_telemetry::MetricsCollector;

/// Message returned for internal failures when details are hidden
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.settings.max_body_bytes;
    let panic_handler = panic_handler(
        state.metrics.clone(),
        state.settings.expose_error_details,
    );

    Router::new()
        .route("/predict", post(predict).fallback(method_not_allowed))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Score the URL in the request body.
///
/// The body is parsed as JSON whatever its content type.
async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    state.metrics.record_request();

    let body = body.map_err(|rejection| {
        state.metrics.record_rejection();
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::Rejected(rejection.status(), rejection.body_text())
    })?;

    let request = parse_request(&body).map_err(|reason| {
        state.metrics.record_error("request");
        error!(kind = "request", "Unreadable request body: {}", reason);
        ApiError::internal_message(reason, state.settings.expose_error_details)
    })?;

    let span = info_span!(
        "predict",
        url_len = request.url.as_deref().map(str::len).unwrap_or(0)
    );
    let _enter = span.enter();

    match state.detector.predict(request.url.as_deref()) {
        Ok(prediction) => {
            state
                .metrics
                .record_prediction(prediction.is_unsafe(), prediction.latency_us);
            info!(
                unsafe_percentage = %prediction.result.unsafe_percentage,
                latency_us = prediction.latency_us,
                "Prediction complete"
            );
            debug!(probabilities = ?prediction.probabilities, "Class probabilities");
            Ok(Json(prediction.result))
        }
        Err(e) if e.is_validation() => {
            state.metrics.record_rejection();
            warn!("Rejected prediction request: {}", e);
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e) => {
            state.metrics.record_error(e.kind());
            error!(kind = e.kind(), "Prediction failed: {}", e);
            Err(ApiError::internal(&e, state.settings.expose_error_details))
        }
    }
}

/// Parse a body that must be a JSON object whose `url`, when present, is a string.
///
/// An absent `url` is left for the detector to reject; `null` or any other
/// non-string value is a malformed request.
fn parse_request(body: &[u8]) -> Result<PredictRequest, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("Failed to decode JSON object: {}", e))?;

    let object = value
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, got {}", json_type(&value)))?;

    let url = match object.get("url") {
        None => None,
        Some(Value::String(url)) => Some(url.clone()),
        Some(other) => return Err(format!("url must be a string, got {}", json_type(other))),
    };

    Ok(PredictRequest { url })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn fallback() -> ApiError {
    ApiError::NotFound
}

/// Build the response used when a handler panics
fn panic_handler(
    metrics: MetricsCollector,
    expose_details: bool,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |panic: Box<dyn Any + Send + 'static>| {
        let detail = if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "handler panicked".to_string()
        };

        metrics.record_error("panic");
        error!("Request handler panicked: {}", detail);

        let message = if expose_details {
            detail
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        };
        ApiError::Internal(message).into_response()
    }
}

/// Error handling
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Rejected(StatusCode, String),
    Internal(String),
    NotFound,
    MethodNotAllowed,
}

impl ApiError {
    /// Internal failure, optionally hiding the underlying message
    pub fn internal(err: &Error, expose_details: bool) -> Self {
        Self::internal_message(err.to_string(), expose_details)
    }

    /// Internal failure from a plain message
    pub fn internal_message(message: impl Into<String>, expose_details: bool) -> Self {
        if expose_details {
            ApiError::Internal(message.into())
        } else {
            ApiError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Rejected(status, msg) => (status, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
