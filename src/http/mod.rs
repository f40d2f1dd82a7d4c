//! HTTP API server for the browser client
//!
//! This module provides a small REST + server-sent events API:
//! - POST /start_translation - Configure and start translation
//! - POST /stop_translation - Stop translation
//! - GET /stream - Server-sent events carrying partial and final translations
//! - GET /status - Whether translation is running, and with which languages
//! - GET /health - Health check
//! - GET / - Static front end

mod handlers;
mod routes;
mod state;

pub use handlers::{ControlResponse, ErrorResponse, StartTranslationRequest};
pub use routes::{create_app, create_router};
pub use state::AppState;
