//! Message framing for the Speech service websocket protocol
//!
//! Text messages are HTTP-style header lines, a blank line, then a body.
//! Binary messages carry a 2-byte big-endian header length, the header block,
//! then the payload.

use crate::engine::{ResultReason, TranslationResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Cursor;

pub const PATH_SPEECH_CONFIG: &str = "speech.config";
pub const PATH_AUDIO: &str = "audio";
pub const PATH_HYPOTHESIS: &str = "translation.hypothesis";
pub const PATH_PHRASE: &str = "translation.phrase";
pub const PATH_TURN_START: &str = "turn.start";
pub const PATH_TURN_END: &str = "turn.end";

pub const SAMPLE_RATE: u32 = 16000;

/// Fresh request/connection id in the dashless form the service expects
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string().to_uppercase()
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Build a text frame
pub fn encode_text_message(path: &str, request_id: &str, content_type: &str, body: &str) -> String {
    format!(
        "Path: {}\r\nX-RequestId: {}\r\nX-Timestamp: {}\r\nContent-Type: {}\r\n\r\n{}",
        path,
        request_id,
        timestamp(),
        content_type,
        body
    )
}

/// Build a binary audio frame. An empty payload marks end of audio.
pub fn encode_audio_message(request_id: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!(
        "Path: {}\r\nX-RequestId: {}\r\nX-Timestamp: {}\r\nContent-Type: audio/x-wav\r\n",
        PATH_AUDIO,
        request_id,
        timestamp()
    );
    let header = header.as_bytes();

    let mut frame = Vec::with_capacity(2 + header.len() + payload.len());
    frame.extend_from_slice(&(header.len() as u16).to_be_bytes());
    frame.extend_from_slice(header);
    frame.extend_from_slice(payload);
    frame
}

/// `speech.config` body describing this client
pub fn speech_config_body() -> String {
    serde_json::json!({
        "context": {
            "system": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "build": "Rust",
                "lang": "Rust"
            },
            "os": {
                "platform": std::env::consts::OS,
                "name": std::env::consts::FAMILY,
                "version": ""
            },
            "audio": {
                "source": {
                    "connectivity": "Unknown",
                    "manufacturer": "Unknown",
                    "model": "Default microphone",
                    "type": "Microphones"
                }
            }
        },
        "recognition": "conversation"
    })
    .to_string()
}

/// RIFF header for an open-ended 16 kHz mono 16-bit stream
pub fn wav_header() -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    hound::WavWriter::new(&mut cursor, spec)
        .context("Failed to write WAV header")?
        .finalize()
        .context("Failed to finalize WAV header")?;

    Ok(cursor.into_inner())
}

/// Little-endian PCM bytes
pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// A parsed text frame
#[derive(Debug)]
pub struct ServiceMessage<'a> {
    pub path: String,
    pub headers: HashMap<String, &'a str>,
    pub body: &'a str,
}

/// Split a text frame into headers and body. Header names are lowercased.
pub fn parse_text_message(raw: &str) -> Option<ServiceMessage<'_>> {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));

    let headers: HashMap<String, &str> = head
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim()))
        .collect();

    let path = headers.get("path")?.to_string();
    Some(ServiceMessage { path, headers, body })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HypothesisBody {
    #[serde(default)]
    text: String,
    translation: Option<TranslationBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PhraseBody {
    recognition_status: String,
    #[serde(default)]
    text: String,
    translation: Option<TranslationBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslationBody {
    translation_status: Option<String>,
    #[serde(default)]
    translations: Vec<LanguageText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LanguageText {
    language: String,
    text: String,
}

fn collect_translations(translation: Option<TranslationBody>) -> HashMap<String, String> {
    translation
        .filter(|t| t.translation_status.as_deref().map_or(true, |s| s == "Success"))
        .map(|t| {
            t.translations
                .into_iter()
                .map(|lt| (lt.language, lt.text))
                .collect()
        })
        .unwrap_or_default()
}

/// Body of `translation.hypothesis`
pub fn parse_hypothesis(body: &str) -> Result<TranslationResult> {
    let parsed: HypothesisBody =
        serde_json::from_str(body).context("Malformed translation.hypothesis body")?;

    Ok(TranslationResult {
        reason: ResultReason::TranslatingSpeech,
        text: parsed.text,
        translations: collect_translations(parsed.translation),
    })
}

/// Body of `translation.phrase`
pub fn parse_phrase(body: &str) -> Result<TranslationResult> {
    let parsed: PhraseBody =
        serde_json::from_str(body).context("Malformed translation.phrase body")?;

    let reason = if parsed.recognition_status == "Success" {
        ResultReason::TranslatedSpeech
    } else {
        ResultReason::NoMatch
    };

    Ok(TranslationResult {
        reason,
        text: parsed.text,
        translations: collect_translations(parsed.translation),
    })
}
