//! Model identifiers.
//!
//! An agent names its model with a plain string. Bare ids such as
//! `gemini-2.0-flash` are Google models; `provider:model` selects a
//! provider explicitly.

pub mod google;

pub use google::GoogleModel;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatecraftError;

/// Top-level language model enum, dispatching to provider-specific variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "provider", content = "model")]
pub enum LanguageModel {
    Google(GoogleModel),
    /// Model served by a provider with no built-in client.
    Custom { provider: String, model_id: String },
}

impl LanguageModel {
    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        match self {
            Self::Google(m) => m.as_str(),
            Self::Custom { model_id, .. } => model_id,
        }
    }

    /// Get the provider name.
    pub fn provider_name(&self) -> &str {
        match self {
            Self::Google(_) => "google",
            Self::Custom { provider, .. } => provider,
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}

impl FromStr for LanguageModel {
    type Err = StatecraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StatecraftError::InvalidArgument(
                "model identifier must not be empty".into(),
            ));
        }

        let Some((provider, model_id)) = s.split_once(':') else {
            return Ok(Self::Google(parse_google(s)));
        };
        if model_id.is_empty() {
            return Err(StatecraftError::InvalidArgument(format!(
                "missing model id in '{s}'"
            )));
        }

        match provider {
            "google" | "gemini" => Ok(Self::Google(parse_google(model_id))),
            _ => Ok(Self::Custom {
                provider: provider.to_string(),
                model_id: model_id.to_string(),
            }),
        }
    }
}

fn parse_google(id: &str) -> GoogleModel {
    // `strum(default)` makes this infallible.
    id.parse()
        .unwrap_or_else(|_| GoogleModel::Custom(id.to_string()))
}
