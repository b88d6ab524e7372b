//! Parameter schemas for tools.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON Schema (object form) describing a tool's arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentToolParameters {
    pub schema: Value,
}

impl AgentToolParameters {
    pub fn from_schema(schema: Value) -> Self {
        Self { schema }
    }

    /// A tool that takes no arguments, like the clock.
    pub fn empty() -> Self {
        Self::object().build()
    }

    pub fn object() -> ParameterBuilder {
        ParameterBuilder::default()
    }

    /// Names of the declared properties.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl Default for AgentToolParameters {
    fn default() -> Self {
        Self::empty()
    }
}

/// Incremental builder for an object schema.
#[derive(Debug, Default)]
pub struct ParameterBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, json!({ "type": "string", "description": description.into() }), required)
    }

    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, json!({ "type": "number", "description": description.into() }), required)
    }

    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, json!({ "type": "integer", "description": description.into() }), required)
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, json!({ "type": "boolean", "description": description.into() }), required)
    }

    /// String restricted to `values`.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        self.property(
            name,
            json!({ "type": "string", "description": description.into(), "enum": values }),
            required,
        )
    }

    /// Add a property with a hand-written schema.
    pub fn property(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
