use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::session::{Session, SessionStore, StoreError};

/// In-process session store.
///
/// Used by tests and by `--memory-sessions` local runs. Sessions are lost on
/// restart and never expire.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<i64, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats with a stored session.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, chat_id: i64) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(&chat_id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, chat_id: i64, session: &Session) -> Result<(), StoreError> {
        self.sessions.insert(chat_id, session.clone());
        Ok(())
    }
}
