use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub speech: SpeechConfig,
    pub stream: StreamConfig,
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Directory holding the browser front end (served at `/`)
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Where the speech credentials live.
///
/// Only the variable names are configured here. Their values are read when a
/// session is configured, so rotating a key does not need a restart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub key_env: String,
    pub region_env: String,
    /// Override for the regional websocket endpoint
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// How long the stream loop waits on the queue before re-checking the active flag
    pub poll_interval_ms: u64,
    /// Flush queued events before closing a stream once translation stops
    pub drain_on_stop: bool,
    /// Drop-oldest cap on buffered events; unbounded when unset
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    pub directory: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "live-translate".to_string(),
            http: HttpConfig::default(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            key_env: "SPEECH_KEY".to_string(),
            region_env: "SPEECH_REGION".to_string(),
            endpoint: None,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            drain_on_stop: false,
            queue_capacity: None,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl StreamConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Config {
    /// Load config from an optional file plus `LIVE_TRANSLATE__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LIVE_TRANSLATE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
