use super::state::AppState;
use crate::error::TranslateError;
use crate::session::{DEFAULT_INPUT_LANGUAGE, DEFAULT_OUTPUT_LANGUAGE};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartTranslationRequest {
    /// Recognition language (default: en-US)
    pub input_language: Option<String>,

    /// Target language (default: en)
    pub output_language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: &TranslateError) -> Response {
    let status = match err {
        TranslateError::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
        TranslateError::InvalidState(_) => StatusCode::CONFLICT,
        TranslateError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        TranslateError::Engine(_) => StatusCode::BAD_GATEWAY,
        TranslateError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /start_translation
/// Configure languages and start translating the microphone
pub async fn start_translation(
    State(state): State<AppState>,
    body: Result<Json<StartTranslationRequest>, JsonRejection>,
) -> impl IntoResponse {
    // No body (or not JSON) means defaults; a JSON body that doesn't parse is an error
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => StartTranslationRequest::default(),
        Err(rejection) => {
            error!("Rejected start request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: rejection.body_text(),
                }),
            )
                .into_response();
        }
    };
    let input_language = req
        .input_language
        .unwrap_or_else(|| DEFAULT_INPUT_LANGUAGE.to_string());
    let output_language = req
        .output_language
        .unwrap_or_else(|| DEFAULT_OUTPUT_LANGUAGE.to_string());

    info!("Start requested: {} -> {}", input_language, output_language);

    if let Err(e) = state
        .controller
        .configure(&input_language, &output_language)
        .await
    {
        error!("Failed to configure translation: {}", e);
        return error_response(&e);
    }

    if let Err(e) = state.controller.start().await {
        error!("Failed to start translation: {}", e);
        return error_response(&e);
    }

    (
        StatusCode::OK,
        Json(ControlResponse {
            status: "started".to_string(),
        }),
    )
        .into_response()
}

/// POST /stop_translation
/// Stop translating. Succeeds whether or not anything was running.
pub async fn stop_translation(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.stop().await;

    (
        StatusCode::OK,
        Json(ControlResponse {
            status: "stopped".to_string(),
        }),
    )
}

/// GET /status
pub async fn translation_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.status().await)
}

/// GET /stream
/// Server-sent events, one `data:` frame per translation, until translation stops
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("Stream client connected");

    let events = state
        .controller
        .events(state.stream)
        .map(|event| Event::default().json_data(&event));

    Sse::new(events)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
