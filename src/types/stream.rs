//! Incremental model output.

use serde::{Deserialize, Serialize};

use super::generation::FinishReason;
use super::message::FunctionCall;
use super::usage::Usage;

/// One step of a streamed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamDelta {
    Text { text: String },
    /// Gemini delivers function calls whole, never split across chunks.
    FunctionCall(FunctionCall),
    Done {
        finish_reason: Option<FinishReason>,
        usage: Option<Usage>,
    },
}

impl StreamDelta {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}
