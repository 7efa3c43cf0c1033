//! Per-chat conversation state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::elasticpath::CartItem;

/// Where a chat currently is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Start,
    ProductList,
    ProductDescription,
    Cart,
    WaitingEmail,
}

/// One product line of the cart mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

/// Everything the bot remembers about a chat between messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub state: ConversationState,
    /// Catalog page currently shown (0-based)
    #[serde(default)]
    pub page: u32,
    /// Last cart contents Elasticpath acknowledged
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

impl Session {
    /// Records a successful add: merges into an existing line or appends.
    pub fn record_added(&mut self, product_id: &str, quantity: u32) {
        match self.cart.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.cart.push(CartLine {
                product_id: product_id.to_string(),
                quantity,
            }),
        }
    }

    /// Replaces the cart mirror with freshly fetched items.
    ///
    /// Items for the same product are summed; order follows the API.
    pub fn sync_cart(&mut self, items: &[CartItem]) {
        self.cart.clear();
        for item in items {
            self.record_added(&item.product_id, item.quantity);
        }
    }

    /// Quantity of a product in the cart mirror (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.cart
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }
}

/// Session store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Redis connectivity or command failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Stored value cannot be (de)serialized
    #[error("Session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Store is unavailable for another reason
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence of sessions keyed by chat id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, or `None` for a chat never seen (or expired).
    async fn get(&self, chat_id: i64) -> Result<Option<Session>, StoreError>;

    /// Stores the session, replacing any previous value.
    async fn put(&self, chat_id: i64, session: &Session) -> Result<(), StoreError>;
}
