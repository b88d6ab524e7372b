//! In-process session storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::{Result, StatecraftError};

use super::{Event, Session, SessionKey, SessionService, State};

type SessionSlot = Arc<Mutex<Session>>;

/// Keeps sessions in memory for the lifetime of the service.
///
/// Each session sits behind its own mutex, so writes to one key are
/// serialized without blocking other sessions.
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, SessionSlot>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions across all apps and users.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &SessionKey) -> Option<SessionSlot> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

fn lock(slot: &SessionSlot) -> MutexGuard<'_, Session> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        state: State,
    ) -> Result<Session> {
        let id = match session_id {
            Some(id) if id.trim().is_empty() => {
                return Err(StatecraftError::InvalidArgument(
                    "session id must not be blank".into(),
                ))
            }
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let key = SessionKey::new(app_name, user_id, &id);

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if sessions.contains_key(&key) {
            return Err(StatecraftError::DuplicateSession {
                app_name: key.app_name,
                user_id: key.user_id,
                session_id: key.session_id,
            });
        }

        let session = Session {
            id,
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            state,
            events: Vec::new(),
            last_update_time: Utc::now(),
        };
        debug!(%key, vars = session.state.len(), "session created");
        sessions.insert(key, Arc::new(Mutex::new(session.clone())));

        Ok(session)
    }

    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session> {
        let key = SessionKey::new(app_name, user_id, session_id);
        let slot = self
            .slot(&key)
            .ok_or_else(|| StatecraftError::session_not_found(app_name, user_id, session_id))?;
        let session = lock(&slot).clone();
        Ok(session)
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>> {
        let slots: Vec<SessionSlot> = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(key, _)| key.app_name == app_name && key.user_id == user_id)
            .map(|(_, slot)| slot.clone())
            .collect();

        let mut sessions: Vec<Session> = slots
            .iter()
            .map(|slot| {
                let mut session = lock(slot).clone();
                session.events.clear();
                session
            })
            .collect();
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sessions)
    }

    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<()> {
        let key = SessionKey::new(app_name, user_id, session_id);
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&key);
        match removed {
            Some(_) => {
                debug!(%key, "session deleted");
                Ok(())
            }
            None => Err(StatecraftError::session_not_found(
                app_name, user_id, session_id,
            )),
        }
    }

    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: Event,
    ) -> Result<Event> {
        if event.partial {
            return Ok(event);
        }

        let key = SessionKey::new(app_name, user_id, session_id);
        let slot = self
            .slot(&key)
            .ok_or_else(|| StatecraftError::session_not_found(app_name, user_id, session_id))?;

        let mut session = lock(&slot);
        if !event.actions.state_delta.is_empty() {
            debug!(%key, keys = ?event.actions.state_delta.keys().collect::<Vec<_>>(), "applying state delta");
            session.state.apply_delta(&event.actions.state_delta);
        }
        session.last_update_time = event.timestamp;
        session.events.push(event.clone());

        Ok(event)
    }
}
