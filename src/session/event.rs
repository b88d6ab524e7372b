//! Events recorded in a session's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Content, FinishReason, Usage};

use super::state::State;

/// Side effects an event applies when it is appended to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventActions {
    /// Variables merged into the session state on append.
    #[serde(default, skip_serializing_if = "State::is_empty")]
    pub state_delta: State,
}

/// One step of a conversation: a user message, a partial or final model
/// response, or a state update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Groups every event produced by one `Runner::run` call.
    pub invocation_id: String,
    /// `"user"` or the name of the agent that produced the event.
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Streaming chunk; never stored in the session history.
    #[serde(default)]
    pub partial: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub actions: EventActions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl Event {
    /// Create an event with a fresh id and the current timestamp.
    pub fn new(invocation_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: None,
            partial: false,
            timestamp: Utc::now(),
            actions: EventActions::default(),
            usage: None,
            finish_reason: None,
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_state_delta(mut self, delta: State) -> Self {
        self.actions.state_delta = delta;
        self
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// True for the complete response that ends a turn.
    ///
    /// Partial chunks, function calls and function responses are
    /// intermediate steps.
    pub fn is_final_response(&self) -> bool {
        if self.partial {
            return false;
        }
        match &self.content {
            Some(content) => {
                content.function_calls().is_empty() && content.function_responses().is_empty()
            }
            None => true,
        }
    }

    /// Concatenated text of the event content, if any.
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().map(Content::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionCall, Part, Role};

    #[test]
    fn complete_text_event_is_final() {
        let event = Event::new("inv-1", "agent").with_content(Content::model("Mexican"));
        assert!(event.is_final_response());
        assert_eq!(event.text().as_deref(), Some("Mexican"));
    }

    #[test]
    fn partial_event_is_not_final() {
        let event = Event::new("inv-1", "agent")
            .with_content(Content::model("Mex"))
            .partial(true);
        assert!(!event.is_final_response());
    }

    #[test]
    fn function_call_event_is_not_final() {
        let event = Event::new("inv-1", "agent").with_content(Content {
            role: Role::Model,
            parts: vec![Part::FunctionCall(FunctionCall {
                id: "call-1".into(),
                name: "get_current_time".into(),
                args: serde_json::json!({}),
            })],
        });
        assert!(!event.is_final_response());
    }

    #[test]
    fn new_events_get_distinct_ids() {
        let a = Event::new("inv", "user");
        let b = Event::new("inv", "user");
        assert_ne!(a.id, b.id);
    }
}
