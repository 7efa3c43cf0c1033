//! Session persistence: Redis in production, in-memory for tests.

mod memory;
mod redis_store;
pub mod session;

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;
pub use session::{CartLine, ConversationState, Session, SessionStore, StoreError};
