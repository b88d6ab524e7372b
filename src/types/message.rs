//! Role-tagged content exchanged with the model.

use serde::{Deserialize, Serialize};

/// A role-tagged content block made of one or more parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model message with a single text part.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// A user turn returning tool results to the model.
    pub fn function_results(responses: impl IntoIterator<Item = FunctionResponse>) -> Self {
        Self {
            role: Role::User,
            parts: responses.into_iter().map(Part::FunctionResponse).collect(),
        }
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Function calls requested in this content.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Function responses carried by this content.
    pub fn function_responses(&self) -> Vec<&FunctionResponse> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionResponse(resp) => Some(resp),
                _ => None,
            })
            .collect()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A single part of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    pub args: serde_json::Value,
}

/// The result of a function call, sent back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub id: String,
    pub name: String,
    pub response: serde_json::Value,
}

impl FunctionResponse {
    /// Answer `call`. Gemini requires an object, so other values are
    /// wrapped as `{"result": value}`.
    pub fn for_call(call: &FunctionCall, response: serde_json::Value) -> Self {
        let response = match response {
            serde_json::Value::Object(_) => response,
            other => serde_json::json!({ "result": other }),
        };
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_only_text_parts() {
        let content = Content {
            role: Role::Model,
            parts: vec![
                Part::text("Mexican "),
                Part::FunctionCall(FunctionCall {
                    id: "1".into(),
                    name: "get_current_time".into(),
                    args: serde_json::json!({}),
                }),
                Part::text("food"),
            ],
        };

        assert_eq!(content.text(), "Mexican food");
        assert_eq!(content.function_calls().len(), 1);
        assert!(content.function_responses().is_empty());
    }

    #[test]
    fn function_results_answer_calls_as_user_turn() {
        let call = FunctionCall {
            id: "call-1".into(),
            name: "get_current_time".into(),
            args: serde_json::json!({}),
        };

        let content = Content::function_results([
            FunctionResponse::for_call(&call, serde_json::json!({ "current_time": "12:00" })),
            FunctionResponse::for_call(&call, serde_json::json!("plain")),
        ]);

        assert_eq!(content.role, Role::User);
        let responses = content.function_responses();
        assert_eq!(responses[0].id, "call-1");
        assert_eq!(responses[0].response["current_time"], "12:00");
        assert_eq!(responses[1].response, serde_json::json!({ "result": "plain" }));
    }

    #[test]
    fn parts_serialize_with_type_tag() {
        let json = serde_json::to_value(Content::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["parts"][0]["type"], "text");
        assert_eq!(json["parts"][0]["text"], "hi");
    }
}
