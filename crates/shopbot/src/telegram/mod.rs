//! Telegram integration: bot setup, update handlers and reply delivery

pub mod bot;
pub mod handlers;
pub mod markdown;
pub mod send;

pub use bot::{Command, create_bot, setup_bot_commands};
pub use handlers::{HandlerDeps, HandlerError, schema};
