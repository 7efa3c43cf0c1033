//! Telegram update handlers

mod schema;
mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
