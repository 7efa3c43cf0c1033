//! Carrying out a dispatcher [`Outcome`] through the Bot API.

use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, MessageId};

use crate::dispatch::{Outcome, Reply};
use crate::telegram::markdown::{send_message_markdown_v2, send_photo_markdown_v2};

/// The button press an outcome answers.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub callback_id: CallbackQueryId,
    pub message_id: MessageId,
}

/// Sends the replies of `outcome` to `chat_id`.
///
/// For a button press the callback query is always answered (with the
/// notice, if any) and the pressed menu is deleted once the new one is out.
pub async fn deliver(bot: &Bot, chat_id: ChatId, trigger: Option<Trigger>, outcome: Outcome) -> ResponseResult<()> {
    if let Some(trigger) = &trigger {
        let mut answer = bot.answer_callback_query(trigger.callback_id.clone());
        if let Some(notice) = outcome.notice {
            answer = answer.text(notice);
        }
        if let Err(e) = answer.await {
            log::warn!("Failed to answer callback query in chat {}: {}", chat_id, e);
        }
    }

    for reply in outcome.replies {
        match reply {
            Reply::Text { text, keyboard } => {
                send_message_markdown_v2(bot, chat_id, text, keyboard).await?;
            }
            Reply::Photo { url, caption, keyboard } => {
                send_photo_markdown_v2(bot, chat_id, &url, caption, keyboard).await?;
            }
        }
    }

    if outcome.delete_trigger {
        if let Some(trigger) = trigger {
            if let Err(e) = bot.delete_message(chat_id, trigger.message_id).await {
                // Messages older than 48h cannot be deleted; not worth failing over.
                log::warn!("Failed to delete message {} in chat {}: {}", trigger.message_id.0, chat_id, e);
            }
        }
    }

    Ok(())
}
