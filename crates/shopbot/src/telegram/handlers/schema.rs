//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::dispatch::Input;
use crate::telegram::send::{Trigger, deliver};

/// Creates the dispatcher schema for the bot.
///
/// Text messages and button presses both go through the shop dispatcher;
/// everything else (stickers, photos, edits) is ignored.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Handler for text messages, commands included
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map(|msg: Message| msg.text().map(str::to_string))
        .endpoint(move |bot: Bot, msg: Message, text: String| {
            let deps = deps.clone();
            async move {
                let chat_id = msg.chat.id;
                log::info!("Message from chat {}: {:?}", chat_id, text);

                let outcome = deps.dispatcher.handle(chat_id.0, Input::Text(text)).await;
                deliver(&bot, chat_id, None, outcome).await?;
                Ok(())
            }
        })
}

/// Handler for inline keyboard presses
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let (Some(data), Some(message)) = (q.data.clone(), q.message.as_ref()) else {
                // Nothing to act on; just stop the button spinner.
                bot.answer_callback_query(q.id.clone()).await?;
                return Ok(());
            };

            let chat_id = message.chat().id;
            log::info!("Callback from chat {}: {:?}", chat_id, data);

            let trigger = Trigger {
                callback_id: q.id.clone(),
                message_id: message.id(),
            };
            let outcome = deps.dispatcher.handle(chat_id.0, Input::Callback(data)).await;
            deliver(&bot, chat_id, Some(trigger), outcome).await?;
            Ok(())
        }
    })
}
