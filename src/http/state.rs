use crate::session::{StreamOptions, TranslationController};
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single translation controller
    pub controller: Arc<TranslationController>,

    /// How `/stream` connections poll and shut down
    pub stream: StreamOptions,
}

impl AppState {
    pub fn new(controller: Arc<TranslationController>, stream: StreamOptions) -> Self {
        Self { controller, stream }
    }
}
