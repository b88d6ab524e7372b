//! Shared test helpers and mock provider.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::BoxStream;

use statecraft::error::{Result, StatecraftError};
use statecraft::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use statecraft::session::{InMemorySessionService, SessionService, State};
use statecraft::types::*;

pub const APP: &str = "Brandon Bot";
pub const USER: &str = "brandon_hancock";

/// A mock provider that returns canned responses and records requests.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<Result<ProviderResponse>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Arc<Self> {
        Arc::new(Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(Ok(ProviderResponse {
            text: text.to_string(),
            function_calls: vec![],
            usage: Usage {
                prompt_tokens: 10,
                response_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a function call response.
    pub fn queue_function_call(&self, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push(Ok(ProviderResponse {
            text: String::new(),
            function_calls: vec![FunctionCall {
                id: "call-1".to_string(),
                name: name.to_string(),
                args,
            }],
            usage: Usage::default(),
            finish_reason: Some(FinishReason::ToolCalls),
        }));
    }

    /// Queue a provider failure.
    pub fn queue_error(&self, err: StatecraftError) {
        self.responses.lock().unwrap().push(Err(err));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ProviderResponse {
                text: "Mock response".to_string(),
                finish_reason: Some(FinishReason::Stop),
                ..Default::default()
            });
        }
        responses.remove(0)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.next_response(request)
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta>>> {
        let response = self.next_response(request)?;

        let stream = async_stream::stream! {
            for chunk in response.text.chars().collect::<Vec<_>>().chunks(5) {
                yield Ok(StreamDelta::text(chunk.iter().collect::<String>()));
            }
            for call in response.function_calls {
                yield Ok(StreamDelta::FunctionCall(call));
            }
            yield Ok(StreamDelta::Done {
                finish_reason: response.finish_reason,
                usage: Some(response.usage),
            });
        };

        Ok(Box::pin(stream))
    }
}

/// Session service holding one session with the given id and state.
pub async fn service_with_session(session_id: &str, state: State) -> Arc<InMemorySessionService> {
    let service = Arc::new(InMemorySessionService::new());
    service
        .create_session(APP, USER, Some(session_id), state)
        .await
        .expect("session should be created");
    service
}

pub fn brandon_state() -> State {
    State::from([
        ("user_name", "Brandon Hancock"),
        (
            "user_preferences",
            "I like to play Pickleball, Disc Golf, and Tennis. My favorite food is Mexican.",
        ),
    ])
}
