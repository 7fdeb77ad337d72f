//! In-memory session storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{SessionStore, StoreError};
use crate::model::SessionId;
use crate::token::SessionTokenRecord;

/// In-memory session store.
///
/// Not persistent; sessions are lost when the process exits.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionTokenRecord>>,
}

impl MemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no session is stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("sessions", &self.len())
            .finish()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session: &SessionId) -> Result<Option<SessionTokenRecord>, StoreError> {
        Ok(self.sessions.read().get(session).cloned())
    }

    async fn save(&self, session: &SessionId, record: SessionTokenRecord) -> Result<(), StoreError> {
        self.sessions.write().insert(session.clone(), record);
        Ok(())
    }

    async fn remove(&self, session: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().remove(session);
        Ok(())
    }

    async fn prune_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at >= cutoff);
        Ok(before - sessions.len())
    }
}
