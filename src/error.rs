use thiserror::Error;

/// Errors surfaced by the translation controller and transcript log
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A credential environment variable is unset or empty
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    /// Language code rejected before reaching the engine
    #[error("invalid language code: {0:?}")]
    InvalidLanguage(String),

    /// Lifecycle call made out of order (e.g. start before configure)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The speech engine refused to start
    #[error("speech engine error: {0}")]
    Engine(String),

    /// Transcript log append failure
    #[error("transcript I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranslateError {
    /// Whether this is a configuration problem (credentials or language codes)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TranslateError::MissingCredential(_) | TranslateError::InvalidLanguage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;
