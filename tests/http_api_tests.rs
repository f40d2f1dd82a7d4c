// Integration tests for the HTTP API
//
// The router is driven in-process with `tower::ServiceExt::oneshot`; the speech
// engine is the fake from `common`.

mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::FakeEngine;
use live_translate::http::{ControlResponse, ErrorResponse};
use live_translate::{create_router, AppState, StreamOptions, TranslationController};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn app(controller: &Arc<TranslationController>) -> Router {
    let stream = StreamOptions {
        poll_interval: Duration::from_millis(20),
        drain_on_stop: false,
    };
    create_router(AppState::new(Arc::clone(controller), stream))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json<T>(response: axum::response::Response) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_start_with_empty_body_applies_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());

    let response = app(&controller)
        .oneshot(post_json("/start_translation", "{}"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: ControlResponse = read_json(response).await?;
    assert_eq!(body.status, "started");

    assert!(controller.is_active());
    let config = engine.last_config().unwrap();
    assert_eq!(config.input_language, "en-US");
    assert_eq!(config.output_language, "en");
    Ok(())
}

#[tokio::test]
async fn test_start_without_body_applies_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());

    let response = app(&controller)
        .oneshot(post_empty("/start_translation"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.last_config().unwrap().input_language, "en-US");
    Ok(())
}

#[tokio::test]
async fn test_start_with_malformed_json_is_bad_request() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());

    let response = app(&controller)
        .oneshot(post_json(
            "/start_translation",
            r#"{"input_language": "es-ES", "output_language": "de""#,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await?;
    assert!(!body.error.is_empty());
    assert!(!controller.is_active());
    assert_eq!(engine.starts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_start_with_wrongly_typed_field_is_bad_request() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());

    let response = app(&controller)
        .oneshot(post_json("/start_translation", r#"{"input_language": 5}"#))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await?;
    assert!(body.error.contains("input_language"));
    assert_eq!(engine.starts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_start_uses_requested_languages() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());

    let response = app(&controller)
        .oneshot(post_json(
            "/start_translation",
            r#"{"input_language": "es-ES", "output_language": "de"}"#,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let config = engine.last_config().unwrap();
    assert_eq!(config.input_language, "es-ES");
    assert_eq!(config.output_language, "de");
    Ok(())
}

#[tokio::test]
async fn test_start_with_bad_language_is_bad_request() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());

    let response = app(&controller)
        .oneshot(post_json("/start_translation", r#"{"output_language": "de DE"}"#))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await?;
    assert!(body.error.contains("de DE"));
    assert!(!controller.is_active());
    assert_eq!(engine.starts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_start_without_credentials_is_error_and_keeps_session() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let speech = common::speech_config_with_credentials();
    let key_env = speech.key_env.clone();
    let controller = common::controller_with(engine.clone(), dir.path(), speech);
    let app = app(&controller);

    let response = app.clone().oneshot(post_json("/start_translation", "{}")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    std::env::remove_var(&key_env);
    let response = app.oneshot(post_json("/start_translation", "{}")).await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = read_json(response).await?;
    assert!(body.error.contains(&key_env));
    assert!(controller.is_active());
    assert_eq!(engine.stops(), 0);
    Ok(())
}

#[tokio::test]
async fn test_engine_failure_is_bad_gateway() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());
    engine.fail_next_start("connection refused");

    let response = app(&controller)
        .oneshot(post_json("/start_translation", "{}"))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(!controller.is_active());
    Ok(())
}

#[tokio::test]
async fn test_stop_without_session_reports_stopped() -> Result<()> {
    let dir = TempDir::new()?;
    let controller = common::controller(FakeEngine::new(), dir.path());
    let app = app(&controller);

    for _ in 0..2 {
        let response = app.clone().oneshot(post_empty("/stop_translation")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: ControlResponse = read_json(response).await?;
        assert_eq!(body.status, "stopped");
        assert!(!controller.is_active());
    }
    Ok(())
}

#[tokio::test]
async fn test_stop_after_start_clears_flag() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());
    let app = app(&controller);

    app.clone().oneshot(post_json("/start_translation", "{}")).await?;
    assert!(controller.is_active());

    let response = app.oneshot(post_empty("/stop_translation")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!controller.is_active());
    assert_eq!(engine.stops(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stream_delivers_frames_and_closes_on_stop() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = FakeEngine::new();
    let controller = common::controller(engine.clone(), dir.path());
    let app = app(&controller);

    let response = app
        .clone()
        .oneshot(post_json("/start_translation", r#"{"input_language": "es-ES"}"#))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    engine.emit_partial("en", "Hola");
    engine.emit_final("en", "Hola mundo");

    let response = app.clone().oneshot(get("/stream")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let body = tokio::spawn(async move {
        axum::body::to_bytes(response.into_body(), usize::MAX).await
    });

    // Wait for the stream to take both events, then stop
    tokio::time::timeout(Duration::from_secs(2), async {
        while !controller.queue().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    let response = app.oneshot(post_empty("/stop_translation")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = tokio::time::timeout(Duration::from_secs(2), body).await???;
    let text = String::from_utf8(bytes.to_vec())?;
    assert_eq!(
        text,
        "data: {\"type\":\"partial\",\"translation\":\"Hola\"}\n\n\
         data: {\"type\":\"final\",\"translation\":\"Hola mundo\"}\n\n"
    );

    let transcript = std::fs::read_to_string(controller.transcript().path())?;
    assert_eq!(transcript, "Partial: Hola\nFinal: Hola mundo\n");
    Ok(())
}

#[tokio::test]
async fn test_stream_when_idle_closes_immediately() -> Result<()> {
    let dir = TempDir::new()?;
    let controller = common::controller(FakeEngine::new(), dir.path());

    let response = app(&controller).oneshot(get("/stream")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = tokio::time::timeout(
        Duration::from_secs(1),
        axum::body::to_bytes(response.into_body(), usize::MAX),
    )
    .await??;
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_status_reports_languages() -> Result<()> {
    let dir = TempDir::new()?;
    let controller = common::controller(FakeEngine::new(), dir.path());
    let app = app(&controller);

    let status: serde_json::Value = read_json(app.clone().oneshot(get("/status")).await?).await?;
    assert_eq!(status["active"], false);
    assert!(status["output_language"].is_null());

    app.clone()
        .oneshot(post_json("/start_translation", r#"{"output_language": "ja"}"#))
        .await?;

    let status: serde_json::Value = read_json(app.oneshot(get("/status")).await?).await?;
    assert_eq!(status["active"], true);
    assert_eq!(status["input_language"], "en-US");
    assert_eq!(status["output_language"], "ja");
    Ok(())
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let dir = TempDir::new()?;
    let controller = common::controller(FakeEngine::new(), dir.path());

    let response = app(&controller).oneshot(get("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
