//! Convenience re-exports for common use.

pub use crate::agent::Agent;
pub use crate::config::StatecraftConfig;
pub use crate::error::{Result, StatecraftError};
pub use crate::models::LanguageModel;
pub use crate::provider::ModelProvider;
pub use crate::runner::{RunConfig, Runner, StreamingMode};
pub use crate::session::{Event, InMemorySessionService, Session, SessionService, State};
pub use crate::template::InstructionTemplate;
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{Content, Part, Role};
