//! Integration tests for the prediction endpoint

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use phishguard_classifiers::{
    Classifier, FeatureExtractor, InferencePipeline, PhishingDetector, WordCorpus, FEATURE_NAMES,
};
use phishguard_core::{Error, ModelSchema, ProbabilityPair, Result};
use phishguard_server::{create_router, AppState, ServerSettings};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// How the test classifier behaves when asked to score
#[derive(Clone, Copy)]
enum Behaviour {
    Fixed { unsafe_p: f64 },
    Fail,
    Panic,
}

struct TestClassifier {
    behaviour: Behaviour,
}

impl Classifier for TestClassifier {
    fn predict_proba(&self, _features: &[f64]) -> Result<ProbabilityPair> {
        match self.behaviour {
            Behaviour::Fixed { unsafe_p } => Ok(ProbabilityPair::new(unsafe_p, 1.0 - unsafe_p)),
            Behaviour::Fail => Err(Error::computation("forest evaluation failed")),
            Behaviour::Panic => panic!("classifier exploded"),
        }
    }

    fn name(&self) -> &str {
        "test"
    }

    fn n_features(&self) -> usize {
        FEATURE_NAMES.len()
    }
}

fn state(behaviour: Behaviour, settings: ServerSettings) -> AppState {
    let corpus = Arc::new(WordCorpus::from_words(["example", "login"]));
    let extractor = FeatureExtractor::new(corpus).unwrap();

    let schema = ModelSchema::new(FEATURE_NAMES.iter().map(|s| s.to_string()).collect()).unwrap();
    let pipeline = InferencePipeline::new(Arc::new(TestClassifier { behaviour }), schema).unwrap();

    AppState::new(Arc::new(PhishingDetector::new(extractor, pipeline)), settings)
}

fn app(behaviour: Behaviour) -> (Router, AppState) {
    let state = state(behaviour, ServerSettings::default());
    (create_router(state.clone()), state)
}

fn post_predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_predict_returns_percentages() {
    let (app, _) = app(Behaviour::Fixed { unsafe_p: 0.125 });

    let (status, body) = send(app, post_predict(r#"{"url": "http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "url": "http://example.com",
            "safety_percentage": "87.5%",
            "unsafe_percentage": "12.5%"
        })
    );
}

#[tokio::test]
async fn test_predict_trims_url() {
    let (app, _) = app(Behaviour::Fixed { unsafe_p: 0.0 });

    let (status, body) = send(app, post_predict(r#"{"url": "  http://example.com/login \n"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "http://example.com/login");
    assert_eq!(body["safety_percentage"], "100.0%");
    assert_eq!(body["unsafe_percentage"], "0.0%");
}

#[tokio::test]
async fn test_missing_or_blank_url_is_bad_request() {
    for payload in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": "   "}"#] {
        let (app, state) = app(Behaviour::Fixed { unsafe_p: 0.5 });

        let (status, body) = send(app, post_predict(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body, json!({"error": "No URL provided"}));
        assert_eq!(state.metrics.snapshot().rejections, 1);
    }
}

#[tokio::test]
async fn test_malformed_body_is_internal_error() {
    let cases = [
        ("not json", "Failed to decode JSON object"),
        ("", "Failed to decode JSON object"),
        ("null", "expected a JSON object, got null"),
        (r#"["http://example.com"]"#, "expected a JSON object, got array"),
        (r#"{"url": 42}"#, "url must be a string, got number"),
        (r#"{"url": null}"#, "url must be a string, got null"),
    ];

    for (payload, expected) in cases {
        let (app, state) = app(Behaviour::Fixed { unsafe_p: 0.5 });

        let (status, body) = send(app, post_predict(payload)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "payload {:?}", payload);
        assert!(
            body["error"].as_str().unwrap().starts_with(expected),
            "payload {:?} gave {}",
            payload,
            body
        );

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.rejections, 0);
    }
}

#[tokio::test]
async fn test_malformed_body_detail_can_be_hidden() {
    let settings = ServerSettings {
        expose_error_details: false,
        ..Default::default()
    };
    let app = create_router(state(Behaviour::Fixed { unsafe_p: 0.5 }, settings));

    let (status, body) = send(app, post_predict(r#"{"url": 42}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_body_parsed_without_json_content_type() {
    let (app, _) = app(Behaviour::Fixed { unsafe_p: 0.25 });

    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .body(Body::from(r#"{"url": "http://example.com"}"#))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["safety_percentage"], "75.0%");
}

#[tokio::test]
async fn test_computation_failure_is_internal_error() {
    let (app, state) = app(Behaviour::Fail);

    let (status, body) = send(app, post_predict(r#"{"url": "http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "forest evaluation failed"}));
    assert_eq!(state.metrics.snapshot().errors, 1);
}

#[tokio::test]
async fn test_error_details_can_be_hidden() {
    let settings = ServerSettings {
        expose_error_details: false,
        ..Default::default()
    };
    let app = create_router(state(Behaviour::Fail, settings));

    let (status, body) = send(app, post_predict(r#"{"url": "http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_panic_becomes_internal_error() {
    let (app, state) = app(Behaviour::Panic);

    let (status, body) = send(app, post_predict(r#"{"url": "http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "classifier exploded");
    assert_eq!(state.metrics.snapshot().errors, 1);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let settings = ServerSettings {
        max_body_bytes: 64,
        ..Default::default()
    };
    let app = create_router(state(Behaviour::Fixed { unsafe_p: 0.5 }, settings));

    let url = format!("http://example.com/{}", "a".repeat(200));
    let (status, body) = send(app, post_predict(json!({ "url": url }).to_string())).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = app(Behaviour::Fixed { unsafe_p: 0.5 });

    let request = Request::builder()
        .method(Method::POST)
        .uri("/classify")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_get_predict_is_method_not_allowed() {
    let (app, _) = app(Behaviour::Fixed { unsafe_p: 0.5 });

    let request = Request::builder()
        .method(Method::GET)
        .uri("/predict")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_metrics_track_outcomes() {
    let (app, state) = app(Behaviour::Fixed { unsafe_p: 0.9 });

    send(app.clone(), post_predict(r#"{"url": "http://192.168.0.1/login"}"#)).await;
    send(app.clone(), post_predict(r#"{"url": "http://example.com"}"#)).await;
    send(app, post_predict(r#"{"url": ""}"#)).await;

    let snapshot = state.metrics.snapshot();
    assert_eq!(snapshot.total_requests, 3);
    assert_eq!(snapshot.predictions, 2);
    assert_eq!(snapshot.unsafe_predictions, 2);
    assert_eq!(snapshot.rejections, 1);
    assert_eq!(snapshot.errors, 0);
}

#[tokio::test]
async fn test_concurrent_requests_share_detector() {
    let (app, state) = app(Behaviour::Fixed { unsafe_p: 0.3 });

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let payload = json!({ "url": format!("http://example.com/page/{}", i) });
                send(app, post_predict(payload.to_string())).await
            })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unsafe_percentage"], "30.0%");
    }

    assert_eq!(state.metrics.snapshot().predictions, 16);
}
