//! Sampling settings and finish reasons, in Gemini's vocabulary.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sampling settings for one model call.
///
/// Serializes directly as Gemini's `generationConfig`; unset fields are
/// omitted so the model's defaults apply.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl GenerationSettings {
    /// True when every field is left to the model's default.
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// Why the model stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    /// Blocked by a safety, recitation or policy filter.
    Safety,
    /// The model asked for one or more function calls.
    ToolCalls,
    Other,
}

impl FinishReason {
    /// Map Gemini's `finishReason` string.
    pub fn from_gemini(raw: &str) -> Self {
        match raw {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => Self::Safety,
            _ => Self::Other,
        }
    }
}
