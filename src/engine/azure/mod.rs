//! Azure Speech translation over the service's websocket protocol

pub mod protocol;
mod worker;

use super::{Credentials, RecognitionHandle, RecognitionListener, TranslationEngine};
use crate::error::{Result, TranslateError};
use crate::session::SessionConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Continuous speech translation from the default microphone
pub struct AzureSpeechEngine {
    /// Replaces `wss://{region}.s2s.speech.microsoft.com/...` when set
    endpoint: Option<String>,
}

impl AzureSpeechEngine {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }

    /// Websocket URL for one session, with languages in the query string
    pub fn session_url(
        &self,
        config: &SessionConfig,
        credentials: &Credentials,
    ) -> Result<url::Url> {
        let base = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "wss://{}.s2s.speech.microsoft.com/speech/translation/cognitiveservices/v1",
                credentials.region
            ),
        };

        let mut url = url::Url::parse(&base)
            .map_err(|e| TranslateError::Engine(format!("invalid endpoint {}: {}", base, e)))?;
        url.query_pairs_mut()
            .append_pair("from", &config.input_language)
            .append_pair("to", &config.output_language)
            .append_pair("format", "detailed");

        Ok(url)
    }
}

impl Default for AzureSpeechEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait::async_trait]
impl TranslationEngine for AzureSpeechEngine {
    fn name(&self) -> &str {
        "azure-speech"
    }

    async fn start(
        &self,
        config: &SessionConfig,
        credentials: &Credentials,
        listener: Arc<dyn RecognitionListener>,
    ) -> Result<Box<dyn RecognitionHandle>> {
        let url = self.session_url(config, credentials)?;
        let stop_signal = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();

        let job = worker::WorkerJob {
            url,
            key: credentials.key.clone(),
            listener,
            stop_signal: Arc::clone(&stop_signal),
            ready: Some(ready_tx),
        };

        std::thread::Builder::new()
            .name("azure-speech".to_string())
            .spawn(move || worker::run(job))
            .map_err(|e| TranslateError::Engine(format!("failed to spawn worker: {}", e)))?;

        match ready_rx.await {
            Ok(Ok(())) => {
                info!(
                    "Azure speech translation armed ({} -> {})",
                    config.input_language, config.output_language
                );
                Ok(Box::new(AzureHandle { stop_signal }))
            }
            Ok(Err(e)) => Err(TranslateError::Engine(format!("{:#}", e))),
            Err(_) => Err(TranslateError::Engine(
                "speech worker exited before it was ready".to_string(),
            )),
        }
    }
}

struct AzureHandle {
    stop_signal: Arc<AtomicBool>,
}

impl RecognitionHandle for AzureHandle {
    fn stop(&mut self) {
        if self.stop_signal.swap(true, Ordering::SeqCst) {
            warn!("Azure speech worker already asked to stop");
        }
    }
}

impl Drop for AzureHandle {
    fn drop(&mut self) {
        // A dropped handle must not leave the microphone streaming
        self.stop_signal.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            key: "secret".to_string(),
            region: "westeurope".to_string(),
        }
    }

    #[test]
    fn regional_url_carries_languages() {
        let engine = AzureSpeechEngine::default();
        let config = SessionConfig::new("es-ES", "en").unwrap();
        let url = engine.session_url(&config, &creds()).unwrap();

        assert_eq!(url.host_str(), Some("westeurope.s2s.speech.microsoft.com"));
        assert_eq!(url.scheme(), "wss");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("from".to_string(), "es-ES".to_string())));
        assert!(query.contains(&("to".to_string(), "en".to_string())));
    }

    #[test]
    fn endpoint_override_is_used() {
        let engine = AzureSpeechEngine::new(Some("ws://127.0.0.1:9000/translate".to_string()));
        let config = SessionConfig::default();
        let url = engine.session_url(&config, &creds()).unwrap();
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert_eq!(url.path(), "/translate");
    }

    #[test]
    fn credentials_debug_hides_key() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("westeurope"));
    }
}
