//! Error types for statecraft.

use thiserror::Error;

/// Primary error type for all statecraft operations.
#[derive(Error, Debug)]
pub enum StatecraftError {
    #[error("Session not found: {app_name}/{user_id}/{session_id}")]
    SessionNotFound {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("Session already exists: {app_name}/{user_id}/{session_id}")]
    DuplicateSession {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("Missing state variable for placeholder `{{{name}}}`")]
    MissingStateVariable { name: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid state file: {0}")]
    StateFile(#[from] toml::de::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

impl StatecraftError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn session_not_found(app_name: &str, user_id: &str, session_id: &str) -> Self {
        Self::SessionNotFound {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }

    /// Whether the error came from the session store rather than the model backend.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound { .. } | Self::DuplicateSession { .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StatecraftError>;
