use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use super::session::{Session, SessionStore, StoreError};
use crate::core::config::{self, RedisSettings};

/// Redis-backed session store.
///
/// Sessions are JSON strings under `shopbot:session:<chat_id>`. When a TTL
/// is configured every write refreshes it, so idle chats expire on their own.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: MultiplexedConnection,
    ttl: Option<Duration>,
}

impl RedisSessionStore {
    /// Connects using startup settings.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, StoreError> {
        let url = settings
            .connection_url()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let client = redis::Client::open(url.as_str())?;
        let connection = client.get_multiplexed_async_connection().await?;

        log::info!("Connected to Redis at {}:{}", settings.host, settings.port);
        Ok(Self::new(connection, settings.session_ttl))
    }

    /// Wraps an existing connection.
    pub fn new(connection: MultiplexedConnection, ttl: Option<Duration>) -> Self {
        Self { connection, ttl }
    }

    /// Key a chat's session lives under.
    pub fn key(chat_id: i64) -> String {
        format!("{}:{}", config::session::KEY_PREFIX, chat_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, chat_id: i64) -> Result<Option<Session>, StoreError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(Self::key(chat_id)).await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, chat_id: i64, session: &Session) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(session)?;

        match self.ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(Self::key(chat_id), json, ttl.as_secs()).await?,
            None => conn.set::<_, _, ()>(Self::key(chat_id), json).await?,
        }
        Ok(())
    }
}
