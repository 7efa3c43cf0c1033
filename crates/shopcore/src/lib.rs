//! Shopcore - commerce and storage plumbing for the Elasticpath shop bot
//!
//! This library holds everything the bot needs that is not Telegram-specific:
//! configuration, error types, logging, the Elasticpath API client and the
//! per-chat session store.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `elasticpath`: Elasticpath (Moltin) REST client and domain models
//! - `storage`: session persistence (Redis and in-memory)

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod core;
pub mod elasticpath;
pub mod storage;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::elasticpath::{Commerce, CommerceError, ElasticpathClient};
pub use crate::storage::{MemorySessionStore, RedisSessionStore, Session, SessionStore, StoreError};
