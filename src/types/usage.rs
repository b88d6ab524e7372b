//! Token accounting.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Token counts reported for a model call.
///
/// Deserializes from Gemini's `usageMetadata`; missing counts are zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default, alias = "promptTokenCount")]
    pub prompt_tokens: u32,
    #[serde(default, alias = "candidatesTokenCount")]
    pub response_tokens: u32,
    #[serde(default, alias = "totalTokenCount")]
    pub total_tokens: u32,
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.response_tokens += other.response_tokens;
        self.total_tokens += other.total_tokens;
    }
}
