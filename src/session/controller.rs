use super::config::SessionConfig;
use super::event::TranslationEvent;
use super::listener::QueueListener;
use super::state::SessionState;
use super::stream::{event_stream, StreamOptions};
use crate::config::SpeechConfig;
use crate::engine::{Credentials, RecognitionHandle, TranslationEngine};
use crate::error::{Result, TranslateError};
use crate::queue::EventQueue;
use crate::transcript::TranscriptLog;
use futures::Stream;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Snapshot of the controller for status queries
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub input_language: Option<String>,
    pub output_language: Option<String>,
}

/// Everything needed to start the engine, captured by `configure`
struct Prepared {
    config: SessionConfig,
    credentials: Credentials,
}

#[derive(Default)]
struct Inner {
    prepared: Option<Prepared>,
    running: Option<Box<dyn RecognitionHandle>>,
    /// Bumped by every start, stop and cancellation. A start only takes effect if
    /// nothing bumped it while the engine was arming.
    generation: u64,
}

/// Session bookkeeping shared with the engine callbacks.
///
/// The lock is never held across an await, so stop stays reachable while a start
/// is still arming the engine.
struct Lifecycle {
    state: SessionState,
    inner: Mutex<Inner>,
}

impl Lifecycle {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// End the current session and return its handle for stopping outside the lock
    fn end_current(&self) -> Option<Box<dyn RecognitionHandle>> {
        let mut inner = self.lock();
        inner.generation += 1;
        self.state.set_active(false);
        inner.running.take()
    }

    /// End session `generation` if it is still the current one
    fn end_if_current(&self, generation: u64) -> Option<Box<dyn RecognitionHandle>> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return None;
        }
        inner.generation += 1;
        self.state.set_active(false);
        inner.running.take()
    }
}

/// Owns the speech engine and the one translation session it may be running.
///
/// Results flow engine thread → [`QueueListener`] → [`EventQueue`] → stream
/// consumers; the controller never calls into the stream side directly.
pub struct TranslationController {
    engine: Arc<dyn TranslationEngine>,
    queue: Arc<EventQueue>,
    transcript: Arc<TranscriptLog>,
    speech: SpeechConfig,
    lifecycle: Arc<Lifecycle>,
}

impl TranslationController {
    pub fn new(
        engine: Arc<dyn TranslationEngine>,
        queue: Arc<EventQueue>,
        transcript: Arc<TranscriptLog>,
        speech: SpeechConfig,
    ) -> Self {
        Self {
            engine,
            queue,
            transcript,
            speech,
            lifecycle: Arc::new(Lifecycle {
                state: SessionState::new(),
                inner: Mutex::new(Inner::default()),
            }),
        }
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn transcript(&self) -> &Arc<TranscriptLog> {
        &self.transcript
    }

    pub fn state(&self) -> &SessionState {
        &self.lifecycle.state
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.state.is_active()
    }

    /// Validate languages and read credentials from the environment.
    ///
    /// On failure nothing changes, including any session already running.
    pub async fn configure(&self, input_language: &str, output_language: &str) -> Result<()> {
        let config = SessionConfig::new(input_language, output_language)?;
        let credentials = self.read_credentials()?;

        self.lifecycle.lock().prepared = Some(Prepared {
            config,
            credentials,
        });

        Ok(())
    }

    /// Start continuous recognition with the configured languages.
    ///
    /// A session that is already running is stopped first, so at most one
    /// recognizer is ever live. Returns once the engine is armed. If a stop (or
    /// another start) arrives while the engine is arming, the new recognizer is
    /// stopped again and this call fails with `InvalidState`.
    pub async fn start(&self) -> Result<()> {
        let (config, credentials, generation, previous) = {
            let mut inner = self.lifecycle.lock();

            let (config, credentials) = match &inner.prepared {
                Some(prepared) => (prepared.config.clone(), prepared.credentials.clone()),
                None => {
                    return Err(TranslateError::InvalidState(
                        "translation must be configured before it is started".to_string(),
                    ))
                }
            };

            inner.generation += 1;
            let previous = inner.running.take();
            if previous.is_some() {
                self.lifecycle.state.set_active(false);
            }
            (config, credentials, inner.generation, previous)
        };

        if let Some(mut previous) = previous {
            warn!("Translation already running, restarting with new settings");
            previous.stop();
        }

        info!(
            "Starting translation {} -> {} with {}",
            config.input_language,
            config.output_language,
            self.engine.name()
        );

        let lifecycle = Arc::clone(&self.lifecycle);
        let listener = Arc::new(QueueListener::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.transcript),
            config.output_language.clone(),
            Box::new(move |_reason: &str| {
                if let Some(mut handle) = lifecycle.end_if_current(generation) {
                    handle.stop();
                    warn!("Translation session ended by the engine");
                }
            }),
        ));

        let mut handle = self.engine.start(&config, &credentials, listener).await?;

        {
            let mut inner = self.lifecycle.lock();
            if inner.generation == generation {
                inner.running = Some(handle);
                self.lifecycle.state.set_active(true);
                info!("Translation started");
                return Ok(());
            }
        }

        handle.stop();
        warn!("Translation was stopped while the engine was starting");
        Err(TranslateError::InvalidState(
            "translation was stopped before it finished starting".to_string(),
        ))
    }

    /// Configure and start in one step
    pub async fn begin(&self, input_language: &str, output_language: &str) -> Result<()> {
        self.configure(input_language, output_language).await?;
        self.start().await
    }

    /// Stop the running session, if any. Safe to call repeatedly, and while a
    /// start is still pending.
    ///
    /// The flag is false when this returns. Callbacks already in flight may
    /// still enqueue.
    pub async fn stop(&self) {
        match self.lifecycle.end_current() {
            Some(mut handle) => {
                handle.stop();
                info!("Translation stopped");
            }
            None => info!("Stop requested with no translation running"),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let inner = self.lifecycle.lock();
        let config = inner.prepared.as_ref().map(|p| &p.config);

        SessionStatus {
            active: self.lifecycle.state.is_active(),
            input_language: config.map(|c| c.input_language.clone()),
            output_language: config.map(|c| c.output_language.clone()),
        }
    }

    /// Live feed of translation events until the session stops
    pub fn events(
        &self,
        options: StreamOptions,
    ) -> impl Stream<Item = TranslationEvent> + Send + 'static {
        event_stream(
            Arc::clone(&self.queue),
            self.lifecycle.state.subscribe(),
            options,
        )
    }

    fn read_credentials(&self) -> Result<Credentials> {
        let key = read_env(&self.speech.key_env)?;
        let region = read_env(&self.speech.region_env)?;
        Ok(Credentials { key, region })
    }
}

fn read_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(TranslateError::MissingCredential(name.to_string())),
    }
}
