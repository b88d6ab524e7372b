//! The `Tool` trait and a closure-backed implementation.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::error::StatecraftError;
use crate::session::{Session, State};

/// What a tool can see of the session that requested it.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub session_id: Option<String>,
    /// Snapshot taken when the call is executed. Writes do not reach the store.
    pub state: State,
}

impl ToolExecutionContext {
    pub fn with_state(state: State) -> Self {
        Self {
            session_id: None,
            state,
        }
    }

    pub fn for_session(session: &Session) -> Self {
        Self {
            session_id: Some(session.id.clone()),
            state: session.state.clone(),
        }
    }
}

/// A function the model may ask to call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses in its function call.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &AgentToolParameters;

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, StatecraftError>;
}

type Handler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value, StatecraftError>>
    + Send
    + Sync;

/// A [`Tool`] whose body is an async closure.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<Handler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, StatecraftError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| handler(args, ctx).boxed()),
        }
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("parameters", &self.parameters.property_names())
            .finish()
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, StatecraftError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}
