use serde::{Deserialize, Serialize};

/// Whether a translation is still being revised by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Partial,
    Final,
}

impl EventKind {
    /// Prefix used for transcript log lines
    pub fn label(self) -> &'static str {
        match self {
            EventKind::Partial => "Partial",
            EventKind::Final => "Final",
        }
    }
}

/// A single translation result handed from the engine thread to the stream handler.
///
/// Serializes to the wire shape the browser expects:
/// `{"type": "partial", "translation": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "translation")]
    pub text: String,
}

impl TranslationEvent {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Partial,
            text: text.into(),
        }
    }

    pub fn final_result(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Final,
            text: text.into(),
        }
    }

    /// Transcript line for this event, newline-terminated
    pub fn log_line(&self) -> String {
        format!("{}: {}\n", self.kind.label(), self.text)
    }
}
