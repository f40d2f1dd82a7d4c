//! Translation session management
//!
//! This module provides the `TranslationController` abstraction that manages:
//! - Session configuration (languages, credentials)
//! - Starting/stopping the speech engine
//! - Routing engine results into the event queue and transcript log
//! - The active flag and the event stream handed to HTTP clients

mod config;
mod controller;
mod event;
mod listener;
mod state;
mod stream;

pub use config::{SessionConfig, DEFAULT_INPUT_LANGUAGE, DEFAULT_OUTPUT_LANGUAGE};
pub use controller::{SessionStatus, TranslationController};
pub use event::{EventKind, TranslationEvent};
pub use listener::{CancelHook, QueueListener};
pub use state::SessionState;
pub use stream::{event_stream, StreamOptions};
