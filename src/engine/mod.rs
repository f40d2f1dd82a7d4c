//! Speech translation engine boundary
//!
//! The engine owns audio capture and recognition. It reports results by calling a
//! [`RecognitionListener`] from its own thread(s), after [`TranslationEngine::start`]
//! has returned.

pub mod azure;

use crate::error::Result;
use crate::session::SessionConfig;
use std::collections::HashMap;
use std::sync::Arc;

pub use azure::AzureSpeechEngine;

/// Subscription credentials for the speech service
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub region: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    /// In-progress hypothesis, may still change
    TranslatingSpeech,
    /// Stable phrase, will not be revised
    TranslatedSpeech,
    /// Speech was heard but nothing was recognized
    NoMatch,
}

/// One recognition result with its translations keyed by language code
#[derive(Debug, Clone)]
pub struct TranslationResult {
    pub reason: ResultReason,
    /// Recognized source-language text
    pub text: String,
    pub translations: HashMap<String, String>,
}

/// Callbacks invoked by the engine. Implementations must not block or panic.
pub trait RecognitionListener: Send + Sync {
    /// Partial (unstable) result
    fn recognizing(&self, result: &TranslationResult);

    /// Final result
    fn recognized(&self, result: &TranslationResult);

    /// Recognition ended abnormally after start
    fn canceled(&self, reason: &str);
}

/// Handle to a running recognition
pub trait RecognitionHandle: Send {
    /// Ask the engine to stop. Returns without waiting for in-flight callbacks.
    fn stop(&mut self);
}

#[async_trait::async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &str;

    /// Arm continuous recognition for `config` and return once it is running
    async fn start(
        &self,
        config: &SessionConfig,
        credentials: &Credentials,
        listener: Arc<dyn RecognitionListener>,
    ) -> Result<Box<dyn RecognitionHandle>>;
}
