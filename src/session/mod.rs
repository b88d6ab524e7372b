//! Sessions: keyed, mutable variable mappings scoped to one conversation.
//!
//! A [`SessionService`] owns every session and hands out snapshots. The
//! only way to change stored state is to append an [`Event`] whose
//! `actions.state_delta` carries the new values.

pub mod event;
pub mod memory;
pub mod state;

pub use event::{Event, EventActions};
pub use memory::InMemorySessionService;
pub use state::State;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A conversation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Grouping label shared by many sessions.
    pub app_name: String,
    pub user_id: String,
    pub state: State,
    /// Non-partial events in append order.
    #[serde(default)]
    pub events: Vec<Event>,
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.app_name, &self.user_id, &self.id)
    }
}

/// Lookup key for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(app_name: &str, user_id: &str, session_id: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// Storage backend for sessions.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Register a new session. A `None` id is replaced with a generated UUID;
    /// a caller-supplied id is stored verbatim.
    ///
    /// Fails with `InvalidArgument` for a blank id and with `DuplicateSession`
    /// if the key is already taken.
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        state: State,
    ) -> Result<Session>;

    /// Fetch a snapshot of a session. Fails with `SessionNotFound`.
    async fn get_session(&self, app_name: &str, user_id: &str, session_id: &str)
        -> Result<Session>;

    /// List a user's sessions without their event history.
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>>;

    /// Remove a session. Fails with `SessionNotFound`.
    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str)
        -> Result<()>;

    /// Record an event and apply its state delta.
    ///
    /// Partial events are returned as-is without touching the session.
    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: Event,
    ) -> Result<Event>;
}
