pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod queue;
pub mod session;
pub mod transcript;

pub use audio::{AudioFrame, MicrophoneCapture};
pub use config::Config;
pub use engine::{
    AzureSpeechEngine, Credentials, RecognitionHandle, RecognitionListener, ResultReason,
    TranslationEngine, TranslationResult,
};
pub use error::TranslateError;
pub use http::{create_app, create_router, AppState};
pub use queue::EventQueue;
pub use session::{
    EventKind, SessionConfig, SessionState, SessionStatus, StreamOptions, TranslationController,
    TranslationEvent,
};
pub use transcript::TranscriptLog;
