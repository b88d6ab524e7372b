//! Runner: binds an agent, a session service and a model provider, and
//! drives one turn per call.
//!
//! Each turn reads the session fresh, hydrates the agent instruction from
//! its state, records the user message, invokes the model and appends the
//! response. Function calls requested by the model
//! are surfaced as events; executing them is up to the caller.

pub mod config;

pub use config::{RunConfig, StreamingMode};

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::config::StatecraftConfig;
use crate::error::{Result, StatecraftError};
use crate::provider::{self, ModelProvider, ProviderRequest, ProviderResponse};
use crate::session::{Event, Session, SessionService, State};
use crate::types::{Content, StreamDelta};

/// Stream of events produced by one run.
pub type EventStream = BoxStream<'static, Result<Event>>;

/// Drives an [`Agent`] against sessions held by a [`SessionService`].
#[derive(Clone)]
pub struct Runner {
    agent: Arc<Agent>,
    app_name: String,
    session_service: Arc<dyn SessionService>,
    provider: Arc<dyn ModelProvider>,
}

impl Runner {
    pub fn new(
        agent: Agent,
        app_name: impl Into<String>,
        session_service: Arc<dyn SessionService>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            agent: Arc::new(agent),
            app_name: app_name.into(),
            session_service,
            provider,
        }
    }

    /// Build a runner whose provider is chosen from the agent's model id.
    pub fn from_config(
        agent: Agent,
        app_name: impl Into<String>,
        session_service: Arc<dyn SessionService>,
        config: &StatecraftConfig,
    ) -> Result<Self> {
        let model = agent.language_model()?;
        let provider: Arc<dyn ModelProvider> = Arc::from(provider::create_provider(&model, config)?);
        Ok(Self::new(agent, app_name, session_service, provider))
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn session_service(&self) -> &Arc<dyn SessionService> {
        &self.session_service
    }

    /// Send `new_message` and stream the resulting events.
    pub fn run(&self, user_id: &str, session_id: &str, new_message: Content) -> EventStream {
        self.run_with_config(user_id, session_id, new_message, RunConfig::default())
    }

    /// Like [`run`](Self::run) with explicit options.
    pub fn run_with_config(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Content,
        config: RunConfig,
    ) -> EventStream {
        let runner = self.clone();
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();

        let stream = async_stream::try_stream! {
            let invocation_id = format!("e-{}", uuid::Uuid::new_v4());
            let service = runner.session_service.clone();
            let app_name = runner.app_name.clone();

            // Lookup and hydration errors surface before anything is written.
            let session = service.get_session(&app_name, &user_id, &session_id).await?;
            let request = runner.build_request(&session, &new_message)?;

            let user_event = Event::new(&invocation_id, "user").with_content(new_message);
            service
                .append_event(&app_name, &user_id, &session_id, user_event)
                .await?;
            info!(
                app = %app_name,
                session = %session_id,
                invocation = %invocation_id,
                model = runner.provider.model_id(),
                "invoking model"
            );

            let response = match config.streaming {
                StreamingMode::None => runner.provider.generate_text(&request).await?,
                StreamingMode::Sse => {
                    let mut deltas = runner.provider.stream_text(&request).await?;
                    let mut response = ProviderResponse::default();
                    while let Some(delta) = deltas.next().await {
                        match delta? {
                            StreamDelta::Text { text } => {
                                response.text.push_str(&text);
                                yield Event::new(&invocation_id, runner.agent.name())
                                    .with_content(Content::model(text))
                                    .partial(true);
                            }
                            StreamDelta::FunctionCall(call) => response.function_calls.push(call),
                            StreamDelta::Done { finish_reason, usage } => {
                                response.finish_reason = finish_reason;
                                if let Some(usage) = usage {
                                    response.usage += usage;
                                }
                            }
                        }
                    }
                    response
                }
            };

            let final_event = runner.response_event(&invocation_id, response);
            let stored = service
                .append_event(&app_name, &user_id, &session_id, final_event)
                .await?;
            debug!(
                session = %session_id,
                final_response = stored.is_final_response(),
                "turn complete"
            );
            yield stored;
        };

        into_event_stream(stream)
    }

    /// Run a turn and return only the final response event.
    pub async fn run_to_completion(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Content,
    ) -> Result<Event> {
        let mut events = self.run(user_id, session_id, new_message);
        let mut last = None;
        while let Some(event) = events.next().await {
            last = Some(event?);
        }
        last.ok_or_else(|| StatecraftError::Stream("run produced no events".into()))
    }

    fn build_request(&self, session: &Session, new_message: &Content) -> Result<ProviderRequest> {
        let system_instruction = self.agent.hydrate_instruction(&session.state)?;
        let mut contents: Vec<Content> = session
            .events
            .iter()
            .filter(|e| !e.partial)
            .filter_map(|e| e.content.clone())
            .collect();
        contents.push(new_message.clone());

        Ok(ProviderRequest {
            system_instruction,
            contents,
            settings: self.agent.settings().clone(),
            tools: self.agent.tool_definitions(),
        })
    }

    fn response_event(&self, invocation_id: &str, response: ProviderResponse) -> Event {
        let usage = response.usage;
        let finish_reason = response.finish_reason;
        let text = response.text.clone();
        let has_calls = !response.function_calls.is_empty();

        let mut event = Event::new(invocation_id, self.agent.name())
            .with_content(response.into_content());
        event.usage = Some(usage);
        event.finish_reason = finish_reason;

        if let Some(key) = self.agent.output_key() {
            if !has_calls {
                event = event.with_state_delta(State::from([(key, text)]));
            }
        }
        event
    }
}

fn into_event_stream<S>(stream: S) -> EventStream
where
    S: futures::Stream<Item = Result<Event>> + Send + 'static,
{
    Box::pin(stream)
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("agent", &self.agent.name())
            .field("app_name", &self.app_name)
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .finish()
    }
}
