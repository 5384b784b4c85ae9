//! Session management

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Session key holding the authenticated user's id
pub const USER_ID_KEY: &str = "user_id";
/// Session key holding the login hash issued at login
pub const LOGIN_HASH_KEY: &str = "login_hash";

/// Key-value state of the current browser session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Drop all state of the current session
    async fn destroy(&mut self) -> Result<()>;

    /// Issue a new session id, keeping the current values
    async fn rotate_transport_token(&mut self) -> Result<()>;

    /// Session id sent to the client, if a session exists
    fn transport_token(&self) -> Option<&str>;
}

/// Stored data of one session
#[derive(Debug, Clone)]
pub struct SessionData {
    pub values: HashMap<String, String>,
    /// When the session was last accessed
    pub last_accessed: chrono::DateTime<chrono::Utc>,
}

impl SessionData {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_accessed: chrono::Utc::now(),
        }
    }

    fn is_expired(&self, idle_timeout: chrono::Duration) -> bool {
        chrono::Utc::now().signed_duration_since(self.last_accessed) > idle_timeout
    }

    fn touch(&mut self) {
        self.last_accessed = chrono::Utc::now();
    }
}

/// Process-wide in-memory session storage
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
    idle_timeout: chrono::Duration,
}

impl SessionManager {
    /// Create a session manager with the given idle timeout
    pub fn new(idle_timeout_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: chrono::Duration::minutes(idle_timeout_minutes),
        }
    }

    /// Create an empty session and return its id
    pub async fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), SessionData::new());
        session_id
    }

    /// Whether a live session exists under this id
    pub async fn contains(&self, session_id: &str) -> bool {
        self.get_session(session_id).await.is_some()
    }

    /// Get a session by ID, dropping it if it has expired
    pub async fn get_session(&self, session_id: &str) -> Option<SessionData> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            if session.is_expired(self.idle_timeout) {
                sessions.remove(session_id);
                tracing::debug!("Session expired");
                return None;
            }
            session.touch();
            return Some(session.clone());
        }
        None
    }

    /// Read one value of a session
    pub async fn get_value(&self, session_id: &str, key: &str) -> Option<String> {
        self.get_session(session_id)
            .await
            .and_then(|s| s.values.get(key).cloned())
    }

    /// Write one value, returning false if the session does not exist
    pub async fn set_value(&self, session_id: &str, key: &str, value: String) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) if !session.is_expired(self.idle_timeout) => {
                session.values.insert(key.to_string(), value);
                session.touch();
                true
            }
            _ => false,
        }
    }

    /// Move a session's data under a fresh id
    pub async fn rotate(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let mut session = sessions.remove(session_id)?;
        if session.is_expired(self.idle_timeout) {
            return None;
        }
        session.touch();
        let new_id = Uuid::new_v4().to_string();
        sessions.insert(new_id.clone(), session);
        Some(new_id)
    }

    /// Delete a session
    pub async fn delete_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Cleanup expired sessions
    pub async fn cleanup_expired(&self) {
        let idle_timeout = self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| !session.is_expired(idle_timeout));
    }

    /// Get session count
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Handle bound to the session a request presented, if any
    pub fn handle(&self, session_id: Option<String>) -> SessionHandle {
        SessionHandle {
            manager: self.clone(),
            session_id,
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(30)
    }
}

/// Request-scoped view of one session in a [`SessionManager`]
///
/// A session is only created once something is written to it.
#[derive(Clone)]
pub struct SessionHandle {
    manager: SessionManager,
    session_id: Option<String>,
}

impl SessionHandle {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

#[async_trait]
impl SessionStore for SessionHandle {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match &self.session_id {
            Some(id) => Ok(self.manager.get_value(id, key).await),
            None => Ok(None),
        }
    }

    async fn set(&mut self, key: &str, value: String) -> Result<()> {
        if let Some(id) = &self.session_id {
            if self.manager.set_value(id, key, value.clone()).await {
                return Ok(());
            }
        }

        let id = self.manager.create_session().await;
        if !self.manager.set_value(&id, key, value).await {
            self.manager.delete_session(&id).await;
            return Err(Error::Session(format!("session expired before '{}' was stored", key)));
        }
        self.session_id = Some(id);
        Ok(())
    }

    async fn destroy(&mut self) -> Result<()> {
        if let Some(id) = self.session_id.take() {
            self.manager.delete_session(&id).await;
        }
        Ok(())
    }

    async fn rotate_transport_token(&mut self) -> Result<()> {
        let new_id = match &self.session_id {
            Some(id) => self.manager.rotate(id).await,
            None => None,
        };
        self.session_id = Some(match new_id {
            Some(id) => id,
            None => self.manager.create_session().await,
        });
        Ok(())
    }

    fn transport_token(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}
