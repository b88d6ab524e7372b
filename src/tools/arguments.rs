//! Arguments of a model-requested function call.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StatecraftError;

/// The `args` object of a function call, with typed lookups.
///
/// Gemini always sends an object; anything else is treated as having no
/// arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// True when the call carried no arguments.
    pub fn is_empty(&self) -> bool {
        self.value.as_object().map_or(true, |m| m.is_empty())
    }

    pub fn get_str(&self, key: &str) -> Result<&str, StatecraftError> {
        self.required(key, "string", Value::as_str)
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, StatecraftError> {
        self.required(key, "integer", Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, StatecraftError> {
        self.required(key, "number", Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, StatecraftError> {
        self.required(key, "boolean", Value::as_bool)
    }

    /// Decode all arguments into `T`. A missing object decodes as `{}`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, StatecraftError> {
        let value = match &self.value {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(value)
            .map_err(|e| StatecraftError::InvalidArgument(format!("Invalid tool arguments: {e}")))
    }

    fn required<'a, T>(
        &'a self,
        key: &str,
        kind: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, StatecraftError> {
        self.value
            .get(key)
            .and_then(extract)
            .ok_or_else(|| StatecraftError::InvalidArgument(format!("Missing {kind} argument: {key}")))
    }
}

impl From<Value> for ToolArguments {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
