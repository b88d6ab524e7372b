//! Core Agent configuration record.

use std::sync::Arc;

use crate::error::Result;
use crate::models::LanguageModel;
use crate::provider::ToolDefinition;
use crate::session::State;
use crate::template::InstructionTemplate;
use crate::tools::tool::Tool;
use crate::types::GenerationSettings;

/// An AI agent: identity, model, instruction template and tools.
///
/// The agent holds no conversation state; everything that changes between
/// turns lives in the session.
#[derive(Clone)]
pub struct Agent {
    name: String,
    model: String,
    description: String,
    instruction: InstructionTemplate,
    tools: Vec<Arc<dyn Tool>>,
    output_key: Option<String>,
    settings: GenerationSettings,
}

impl Agent {
    /// Create a new agent for the given model identifier.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            description: String::new(),
            instruction: InstructionTemplate::default(),
            tools: Vec::new(),
            output_key: None,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the instruction template. `{name}` placeholders are filled from
    /// session state before every model call.
    pub fn with_instruction(mut self, instruction: impl Into<InstructionTemplate>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Store the final response text in session state under `key`.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Set generation settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instruction(&self) -> &InstructionTemplate {
        &self.instruction
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn output_key(&self) -> Option<&str> {
        self.output_key.as_deref()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Parse the model identifier.
    pub fn language_model(&self) -> Result<LanguageModel> {
        self.model.parse()
    }

    /// Resolve the instruction against `state`. `None` when the agent has
    /// no instruction.
    pub fn hydrate_instruction(&self, state: &State) -> Result<Option<String>> {
        if self.instruction.as_str().trim().is_empty() {
            return Ok(None);
        }
        self.instruction.hydrate(state).map(Some)
    }

    /// Look up a tool by the name the model uses for it.
    pub fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Definitions advertised to the model.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::from_tool(t.as_ref()))
            .collect()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("description", &self.description)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("output_key", &self.output_key)
            .finish()
    }
}
