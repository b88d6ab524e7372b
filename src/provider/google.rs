//! Google Gemini API provider.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StatecraftError};
use crate::models::GoogleModel;
use crate::types::*;

use super::http::{network_error, parse_sse_data, shared_client, LineBuffer};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GoogleProvider {
    model: GoogleModel,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(model: GoogleModel, api_key: String) -> Self {
        Self {
            model,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at another endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model.as_str(), method)
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = request
            .contents
            .iter()
            .filter(|c| !c.parts.is_empty())
            .map(|c| {
                serde_json::json!({
                    "role": match c.role {
                        Role::User => "user",
                        Role::Model => "model",
                    },
                    "parts": build_gemini_parts(&c.parts),
                })
            })
            .collect();

        let mut body = serde_json::Map::new();
        body.insert("contents".into(), serde_json::Value::Array(contents));

        if let Some(ref sys) = request.system_instruction {
            body.insert(
                "systemInstruction".into(),
                serde_json::json!({ "parts": [{ "text": sys }] }),
            );
        }

        if !request.settings.is_default() {
            body.insert("generationConfig".into(), serde_json::json!(request.settings));
        }

        if !request.tools.is_empty() {
            let fn_decls: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": gemini_parameters(&t.parameters),
                    })
                })
                .collect();
            body.insert(
                "tools".into(),
                serde_json::json!([{ "functionDeclarations": fn_decls }]),
            );
        }

        serde_json::Value::Object(body)
    }

    async fn post(&self, url: &str, request: &ProviderRequest) -> Result<reqwest::Response> {
        let body = self.build_request_body(request);
        let resp = shared_client()
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status, &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        debug!(model = self.model.as_str(), "Google generate_text");

        let resp = self.post(&self.url("generateContent"), request).await?;
        let data: GeminiResponse = resp.json().await.map_err(network_error)?;

        let usage = data.usage_metadata.unwrap_or_default();
        let candidate = data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| StatecraftError::api(200, "No candidates in Gemini response"))?;

        let mut text = String::new();
        let mut function_calls = Vec::new();

        for part in candidate.content.parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(fc) = part.function_call {
                function_calls.push(fc.into_call());
            }
        }

        let finish_reason = if function_calls.is_empty() {
            candidate.finish_reason.as_deref().map(FinishReason::from_gemini)
        } else {
            Some(FinishReason::ToolCalls)
        };

        Ok(ProviderResponse {
            text,
            function_calls,
            usage,
            finish_reason,
        })
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta>>> {
        debug!(model = self.model.as_str(), "Google stream_text");

        let resp = self
            .post(&self.url("streamGenerateContent?alt=sse"), request)
            .await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = LineBuffer::default();
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(network_error(e));
                        break;
                    }
                };
                lines.push(&chunk);

                while let Some(line) = lines.next_line() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            yield Err(e);
                            continue;
                        }
                    };
                    let Some(data) = parse_sse_data(line.trim()) else {
                        continue;
                    };
                    let resp = match serde_json::from_str::<GeminiResponse>(data) {
                        Ok(resp) => resp,
                        Err(e) => {
                            yield Err(StatecraftError::Stream(format!("bad Gemini chunk: {e}")));
                            continue;
                        }
                    };
                    for delta in chunk_deltas(resp) {
                        yield Ok(delta);
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn chunk_deltas(resp: GeminiResponse) -> Vec<StreamDelta> {
    let usage = resp.usage_metadata;
    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Vec::new();
    };

    let mut deltas = Vec::new();
    let mut saw_call = false;
    for part in candidate.content.parts {
        if let Some(t) = part.text {
            deltas.push(StreamDelta::text(t));
        }
        if let Some(fc) = part.function_call {
            saw_call = true;
            deltas.push(StreamDelta::FunctionCall(fc.into_call()));
        }
    }

    if let Some(raw) = candidate.finish_reason.as_deref() {
        let finish_reason = if saw_call {
            FinishReason::ToolCalls
        } else {
            FinishReason::from_gemini(raw)
        };
        deltas.push(StreamDelta::Done {
            finish_reason: Some(finish_reason),
            usage,
        });
    }
    deltas
}

fn build_gemini_parts(parts: &[Part]) -> Vec<serde_json::Value> {
    parts
        .iter()
        .map(|part| match part {
            Part::Text { text } => serde_json::json!({ "text": text }),
            Part::FunctionCall(call) => serde_json::json!({
                "functionCall": { "name": call.name, "args": call.args }
            }),
            Part::FunctionResponse(resp) => serde_json::json!({
                "functionResponse": { "name": resp.name, "response": resp.response }
            }),
        })
        .collect()
}

/// Gemini rejects empty `properties` objects in function declarations.
fn gemini_parameters(schema: &serde_json::Value) -> serde_json::Value {
    let has_properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .is_some_and(|p| !p.is_empty());
    if has_properties {
        schema.clone()
    } else {
        serde_json::Value::Null
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<Usage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<serde_json::Value>,
}

impl GeminiFunctionCall {
    fn into_call(self) -> FunctionCall {
        FunctionCall {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            args: self
                .args
                .unwrap_or(serde_json::Value::Object(Default::default())),
        }
    }
}
