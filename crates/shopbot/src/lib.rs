//! Shopbot - Telegram storefront for an Elasticpath shop
//!
//! # Module Structure
//!
//! - `dispatch`: conversation state machine, independent of Telegram
//! - `telegram`: bot setup, update handlers, reply delivery
//! - `upload`: catalog upload tools behind the CLI subcommands
//! - `cli`: command-line interface

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod dispatch;
pub mod telegram;
pub mod upload;

pub use dispatch::{Input, Outcome, Reply, ShopDispatcher};
