use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, ParseMode};
use url::Url;

/// Escapes the characters MarkdownV2 treats as markup.
///
/// Catalog data (names, prices, descriptions) goes through this before it
/// is embedded in a formatted message.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}' | '.' | '!'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Turns MarkdownV2 back into plain text: escapes are resolved and the
/// unescaped markup characters (`*`, `_`, `~`, `` ` ``, `|`) are dropped.
pub fn strip_markdown_v2(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    plain.push(escaped);
                }
            }
            '*' | '_' | '~' | '`' | '|' => {}
            _ => plain.push(c),
        }
    }
    plain
}

fn is_markdown_parse_error(err: &RequestError) -> bool {
    err.to_string().to_lowercase().contains("can't parse entities")
}

/// Sends a MarkdownV2 message, falling back to plain text on parse errors.
pub async fn send_message_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<Message> {
    let text = text.into();
    let mut req = bot.send_message(chat_id, text.clone()).parse_mode(ParseMode::MarkdownV2);
    if let Some(kb) = keyboard.clone() {
        req = req.reply_markup(kb);
    }

    match req.await {
        Ok(msg) => Ok(msg),
        Err(e) if is_markdown_parse_error(&e) => {
            log::warn!("MarkdownV2 rejected for chat {}, resending as plain text: {}", chat_id, e);
            let mut retry = bot.send_message(chat_id, strip_markdown_v2(&text));
            if let Some(kb) = keyboard {
                retry = retry.reply_markup(kb);
            }
            retry.await
        }
        Err(e) => Err(e),
    }
}

/// Sends a photo with a MarkdownV2 caption.
///
/// Telegram fetches the image itself; when it cannot (bad URL, file gone),
/// the caption is sent as a text message instead.
pub async fn send_photo_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    photo_url: &str,
    caption: String,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<Message> {
    let url = match Url::parse(photo_url) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Invalid image URL {:?}: {}", photo_url, e);
            return send_message_markdown_v2(bot, chat_id, caption, keyboard).await;
        }
    };

    let mut req = bot
        .send_photo(chat_id, InputFile::url(url))
        .caption(caption.clone())
        .parse_mode(ParseMode::MarkdownV2);
    if let Some(kb) = keyboard.clone() {
        req = req.reply_markup(kb);
    }

    match req.await {
        Ok(msg) => Ok(msg),
        Err(e) => {
            log::warn!("Failed to send photo to chat {}: {}. Sending text instead", chat_id, e);
            send_message_markdown_v2(bot, chat_id, caption, keyboard).await
        }
    }
}
