//! Bot instance creation and the command menu

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use shopcore::config::{self, Settings};
use shopcore::AppResult;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the catalog")]
    Start,
    #[command(description = "show your cart")]
    Cart,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Errors
/// Fails only if the HTTP client cannot be built.
pub fn create_bot(settings: &Settings) -> AppResult<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(settings.telegram_bot_token.expose_secret(), client);

    Ok(match &settings.bot_api_url {
        Some(url) => {
            log::info!("Using custom Bot API URL: {}", url);
            bot.set_api_url(url.clone())
        }
        None => bot,
    })
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> AppResult<()> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
