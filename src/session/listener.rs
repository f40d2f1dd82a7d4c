use super::event::TranslationEvent;
use crate::engine::{RecognitionListener, ResultReason, TranslationResult};
use crate::queue::EventQueue;
use crate::transcript::TranscriptLog;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Called once when the engine gives up on a session
pub type CancelHook = Box<dyn Fn(&str) + Send + Sync>;

/// Engine callbacks for one session: enqueue each translation and append it to the
/// transcript.
///
/// Runs on the engine's thread. Nothing here may block for long or panic; transcript
/// failures are logged and the event is still enqueued.
pub struct QueueListener {
    queue: Arc<EventQueue>,
    transcript: Arc<TranscriptLog>,
    target_language: String,
    on_cancel: CancelHook,
}

impl QueueListener {
    pub fn new(
        queue: Arc<EventQueue>,
        transcript: Arc<TranscriptLog>,
        target_language: String,
        on_cancel: CancelHook,
    ) -> Self {
        Self {
            queue,
            transcript,
            target_language,
            on_cancel,
        }
    }

    fn deliver(&self, event: TranslationEvent) {
        let line = event.log_line();
        self.queue.push(event);

        if let Err(e) = self.transcript.append(&line) {
            error!(
                "Failed to append to transcript {}: {}",
                self.transcript.path().display(),
                e
            );
        }
    }

    fn target_text<'a>(&self, result: &'a TranslationResult) -> Option<&'a str> {
        let text = result.translations.get(&self.target_language);
        if text.is_none() {
            warn!(
                "Result carries no '{}' translation (got {:?})",
                self.target_language,
                result.translations.keys().collect::<Vec<_>>()
            );
        }
        text.map(String::as_str)
    }
}

impl RecognitionListener for QueueListener {
    fn recognizing(&self, result: &TranslationResult) {
        if result.reason != ResultReason::TranslatingSpeech {
            return;
        }
        if let Some(text) = self.target_text(result) {
            self.deliver(TranslationEvent::partial(text));
        }
    }

    fn recognized(&self, result: &TranslationResult) {
        if result.reason != ResultReason::TranslatedSpeech {
            debug!("Ignoring final result with reason {:?}", result.reason);
            return;
        }
        if let Some(text) = self.target_text(result) {
            self.deliver(TranslationEvent::final_result(text));
        }
    }

    fn canceled(&self, reason: &str) {
        error!("Speech translation canceled: {}", reason);
        (self.on_cancel)(reason);
    }
}
