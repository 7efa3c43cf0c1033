//! Handler types and dependencies

use std::sync::Arc;

use crate::dispatch::ShopDispatcher;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub dispatcher: Arc<ShopDispatcher>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(dispatcher: Arc<ShopDispatcher>) -> Self {
        Self { dispatcher }
    }
}
