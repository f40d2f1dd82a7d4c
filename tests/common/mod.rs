// Shared fixtures for integration tests: a fake speech engine that delivers
// results from its own thread, and a controller wired to it.

#![allow(dead_code)]

use live_translate::config::SpeechConfig;
use live_translate::{
    Credentials, EventQueue, RecognitionHandle, RecognitionListener, ResultReason, SessionConfig,
    TranscriptLog, TranslateError, TranslationController, TranslationEngine, TranslationResult,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Engine double that records lifecycle calls and lets tests emit results
#[derive(Default)]
pub struct FakeEngine {
    /// Listener of every successful start, oldest first
    listeners: Mutex<Vec<Arc<dyn RecognitionListener>>>,
    configs: Mutex<Vec<SessionConfig>>,
    starts: AtomicUsize,
    stops: Arc<AtomicUsize>,
    fail_next_start: Mutex<Option<String>>,
    start_delay: Mutex<Option<Duration>>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn last_config(&self) -> Option<SessionConfig> {
        self.configs.lock().unwrap().last().cloned()
    }

    pub fn fail_next_start(&self, reason: &str) {
        *self.fail_next_start.lock().unwrap() = Some(reason.to_string());
    }

    /// Make every start take `delay` before the recognizer is armed
    pub fn set_start_delay(&self, delay: Duration) {
        *self.start_delay.lock().unwrap() = Some(delay);
    }

    /// Report that the latest session was canceled by the service
    pub fn emit_canceled(&self, reason: &str) {
        let listener = self.latest_listener();
        let reason = reason.to_string();
        std::thread::spawn(move || listener.canceled(&reason))
            .join()
            .unwrap();
    }

    /// Report a cancellation from the session started `index`-th (zero-based)
    pub fn emit_canceled_for(&self, index: usize, reason: &str) {
        let listener = Arc::clone(&self.listeners.lock().unwrap()[index]);
        let reason = reason.to_string();
        std::thread::spawn(move || listener.canceled(&reason))
            .join()
            .unwrap();
    }

    /// Deliver an in-progress result for `language` from a separate thread
    pub fn emit_partial(&self, language: &str, text: &str) {
        self.emit(ResultReason::TranslatingSpeech, language, text, false);
    }

    /// Deliver a final result for `language` from a separate thread
    pub fn emit_final(&self, language: &str, text: &str) {
        self.emit(ResultReason::TranslatedSpeech, language, text, true);
    }

    /// Deliver a final-channel result with an arbitrary reason
    pub fn emit_recognized(&self, reason: ResultReason, language: &str, text: &str) {
        self.emit(reason, language, text, true);
    }

    fn emit(&self, reason: ResultReason, language: &str, text: &str, is_final: bool) {
        let listener = self.latest_listener();

        let mut translations = HashMap::new();
        translations.insert(language.to_string(), text.to_string());
        let result = TranslationResult {
            reason,
            text: format!("source of {}", text),
            translations,
        };

        std::thread::spawn(move || {
            if is_final {
                listener.recognized(&result);
            } else {
                listener.recognizing(&result);
            }
        })
        .join()
        .unwrap();
    }

    fn latest_listener(&self) -> Arc<dyn RecognitionListener> {
        self.listeners
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("engine was never started")
    }
}

struct FakeHandle {
    stops: Arc<AtomicUsize>,
}

impl RecognitionHandle for FakeHandle {
    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl TranslationEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn start(
        &self,
        config: &SessionConfig,
        _credentials: &Credentials,
        listener: Arc<dyn RecognitionListener>,
    ) -> Result<Box<dyn RecognitionHandle>, TranslateError> {
        let delay = *self.start_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = self.fail_next_start.lock().unwrap().take() {
            return Err(TranslateError::Engine(reason));
        }

        self.starts.fetch_add(1, Ordering::SeqCst);
        self.configs.lock().unwrap().push(config.clone());
        self.listeners.lock().unwrap().push(listener);

        Ok(Box::new(FakeHandle {
            stops: Arc::clone(&self.stops),
        }))
    }
}

/// Speech config pointing at per-test environment variables, set to dummy values
pub fn speech_config_with_credentials() -> SpeechConfig {
    let suffix = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    let key_env = format!("LT_TEST_KEY_{}", suffix);
    let region_env = format!("LT_TEST_REGION_{}", suffix);
    std::env::set_var(&key_env, "test-key");
    std::env::set_var(&region_env, "westeurope");

    SpeechConfig {
        key_env,
        region_env,
        endpoint: None,
    }
}

/// Speech config naming environment variables that are never set
pub fn speech_config_without_credentials() -> SpeechConfig {
    let suffix = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    SpeechConfig {
        key_env: format!("LT_TEST_UNSET_KEY_{}", suffix),
        region_env: format!("LT_TEST_UNSET_REGION_{}", suffix),
        endpoint: None,
    }
}

pub fn controller_with(
    engine: Arc<FakeEngine>,
    transcript_dir: &Path,
    speech: SpeechConfig,
) -> Arc<TranslationController> {
    let transcript = Arc::new(TranscriptLog::for_today(transcript_dir));
    transcript.reset().unwrap();

    Arc::new(TranslationController::new(
        engine,
        Arc::new(EventQueue::new()),
        transcript,
        speech,
    ))
}

/// Controller with valid credentials and a fresh transcript in `transcript_dir`
pub fn controller(engine: Arc<FakeEngine>, transcript_dir: &Path) -> Arc<TranslationController> {
    controller_with(engine, transcript_dir, speech_config_with_credentials())
}
