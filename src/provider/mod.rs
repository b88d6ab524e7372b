//! Model provider trait and implementations.
//!
//! The model backend is external: the runner only talks to it through
//! [`ModelProvider`].

pub mod http;

#[cfg(feature = "google")]
pub mod google;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::config::StatecraftConfig;
use crate::error::{Result, StatecraftError};
use crate::models::LanguageModel;
use crate::tools::Tool;
use crate::types::{
    Content, FinishReason, FunctionCall, GenerationSettings, Part, Role, StreamDelta, Usage,
};

/// A request sent to a model provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    /// Fully hydrated system instruction.
    pub system_instruction: Option<String>,
    /// Conversation history, oldest first, ending with the new message.
    pub contents: Vec<Content>,
    pub settings: GenerationSettings,
    pub tools: Vec<ToolDefinition>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters().schema.clone(),
        }
    }
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// Convert into model-authored content: text first, then function calls.
    pub fn into_content(self) -> Content {
        let mut parts = Vec::with_capacity(1 + self.function_calls.len());
        if !self.text.is_empty() {
            parts.push(Part::text(self.text));
        }
        parts.extend(self.function_calls.into_iter().map(Part::FunctionCall));
        Content {
            role: Role::Model,
            parts,
        }
    }
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a complete response.
    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Generate a response as a stream of deltas.
    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta>>>;
}

/// Create a provider for the given model, using the provided config.
#[allow(unused_variables)]
pub fn create_provider(
    model: &LanguageModel,
    config: &StatecraftConfig,
) -> Result<Box<dyn ModelProvider>> {
    match model {
        #[cfg(feature = "google")]
        LanguageModel::Google(m) => {
            let api_key = config
                .get_api_key("google")
                .ok_or_else(|| StatecraftError::Authentication("Missing GOOGLE_API_KEY".into()))?;
            let provider = google::GoogleProvider::new(m.clone(), api_key);
            Ok(Box::new(match config.get_base_url("google") {
                Some(url) => provider.with_base_url(url),
                None => provider,
            }))
        }
        LanguageModel::Custom { provider, .. } => Err(StatecraftError::ModelNotFound(format!(
            "No built-in provider for '{provider}'"
        ))),
        #[allow(unreachable_patterns)]
        _ => Err(StatecraftError::ModelNotFound(format!(
            "Provider for model '{model}' not enabled via feature flags"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_content_orders_text_before_calls() {
        let response = ProviderResponse {
            text: "Checking the clock.".into(),
            function_calls: vec![FunctionCall {
                id: "call-1".into(),
                name: "get_current_time".into(),
                args: serde_json::json!({}),
            }],
            ..Default::default()
        };

        let content = response.into_content();

        assert_eq!(content.role, Role::Model);
        assert_eq!(content.text(), "Checking the clock.");
        assert!(matches!(content.parts[1], Part::FunctionCall(_)));
    }

    #[test]
    fn empty_text_produces_no_text_part() {
        let content = ProviderResponse::default().into_content();
        assert!(content.parts.is_empty());
    }

    #[test]
    fn custom_models_have_no_provider() {
        let model: LanguageModel = "openai:gpt-4o".parse().unwrap();
        let err = create_provider(&model, &StatecraftConfig::new()).err().unwrap();
        assert!(matches!(err, StatecraftError::ModelNotFound(_)));
    }

    #[cfg(feature = "google")]
    #[test]
    fn google_requires_api_key() {
        let model: LanguageModel = "gemini-2.0-flash".parse().unwrap();
        let err = create_provider(&model, &StatecraftConfig::new()).err().unwrap();
        assert!(matches!(err, StatecraftError::Authentication(_)));

        let config = StatecraftConfig::new();
        config.set_api_key("google", "key".into());
        let provider = create_provider(&model, &config).unwrap();
        assert_eq!(provider.provider_name(), "google");
        assert_eq!(provider.model_id(), "gemini-2.0-flash");
    }
}
