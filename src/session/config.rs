use crate::error::{Result, TranslateError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_LANGUAGE: &str = "en-US";
pub const DEFAULT_OUTPUT_LANGUAGE: &str = "en";

/// Languages for one translation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Recognition language of the microphone audio (e.g. "en-US")
    pub input_language: String,

    /// The single target language translations are read from (e.g. "de")
    pub output_language: String,
}

impl SessionConfig {
    /// Build a config, checking both codes look like BCP-47 tags
    pub fn new(
        input_language: impl Into<String>,
        output_language: impl Into<String>,
    ) -> Result<Self> {
        let input_language = input_language.into().trim().to_string();
        let output_language = output_language.into().trim().to_string();

        validate_language(&input_language)?;
        validate_language(&output_language)?;

        Ok(Self {
            input_language,
            output_language,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_language: DEFAULT_INPUT_LANGUAGE.to_string(),
            output_language: DEFAULT_OUTPUT_LANGUAGE.to_string(),
        }
    }
}

/// Subtags of 1-8 ASCII alphanumerics separated by '-'
fn validate_language(code: &str) -> Result<()> {
    let well_formed = !code.is_empty()
        && code.split('-').all(|subtag| {
            (1..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
        });

    if well_formed {
        Ok(())
    } else {
        Err(TranslateError::InvalidLanguage(code.to_string()))
    }
}
