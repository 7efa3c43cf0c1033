//! Conversation state machine.
//!
//! [`ShopDispatcher::handle`] is the whole bot minus Telegram: it loads the
//! chat's session, works out what the user wants, talks to the commerce
//! API, stores the new session and describes the replies to send. The
//! Telegram layer only translates updates into [`Input`] and an
//! [`Outcome`] into API calls.
//!
//! A session is written only after the action behind it succeeded, so a
//! failed commerce call leaves both the state and the cart mirror as they
//! were.

pub mod intent;
pub mod render;

use std::sync::Arc;

use teloxide::types::InlineKeyboardMarkup;

use shopcore::config::catalog::PAGE_SIZE;
use shopcore::elasticpath::Product;
use shopcore::storage::{ConversationState, Session, SessionStore, StoreError};
use shopcore::{Commerce, CommerceError};

use crate::telegram::markdown::escape_markdown_v2;
use intent::{Intent, is_valid_email};

/// Name given to customers created at checkout.
pub const DEFAULT_CUSTOMER_NAME: &str = "Anonymous";

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A text message
    Text(String),
    /// Data of a pressed inline button
    Callback(String),
}

impl Input {
    pub fn is_callback(&self) -> bool {
        matches!(self, Input::Callback(_))
    }
}

/// One message to send back. Texts and captions are MarkdownV2.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Photo {
        url: String,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
}

impl Reply {
    /// Plain text, escaped for MarkdownV2.
    pub fn plain(text: &str) -> Self {
        Reply::Text {
            text: escape_markdown_v2(text),
            keyboard: None,
        }
    }

    /// Already formatted MarkdownV2 text with a keyboard.
    pub fn markdown(text: String, keyboard: InlineKeyboardMarkup) -> Self {
        Reply::Text {
            text,
            keyboard: Some(keyboard),
        }
    }

    /// Text (or caption) of the reply.
    pub fn text(&self) -> &str {
        match self {
            Reply::Text { text, .. } => text,
            Reply::Photo { caption, .. } => caption,
        }
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboardMarkup> {
        match self {
            Reply::Text { keyboard, .. } | Reply::Photo { keyboard, .. } => keyboard.as_ref(),
        }
    }
}

/// Everything the Telegram layer should do in response to one input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub replies: Vec<Reply>,
    /// Short text for the callback query answer (toast)
    pub notice: Option<String>,
    /// Delete the message whose button was pressed
    pub delete_trigger: bool,
}

impl Outcome {
    fn reply(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            ..Self::default()
        }
    }

    /// A fresh screen that replaces the menu the user pressed a button on.
    fn screen(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            delete_trigger: true,
            ..Self::default()
        }
    }

    fn notice(text: &str) -> Self {
        Self {
            notice: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Reply for a failed commerce call.
    pub fn commerce_failure(err: &CommerceError) -> Self {
        if err.is_client_error() {
            Self::reply(Reply::plain(render::CLIENT_FAILURE))
        } else {
            Self::reply(Reply::plain(render::SERVER_FAILURE))
        }
    }

    /// Reply for an unreachable or broken session store.
    pub fn store_failure() -> Self {
        Self::reply(Reply::plain(render::STORE_FAILURE))
    }
}

/// Drives one chat's conversation against a commerce backend and a session store.
#[derive(Clone)]
pub struct ShopDispatcher {
    commerce: Arc<dyn Commerce>,
    sessions: Arc<dyn SessionStore>,
}

impl ShopDispatcher {
    pub fn new(commerce: Arc<dyn Commerce>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { commerce, sessions }
    }

    /// Processes one input for `chat_id` and returns what to send back.
    ///
    /// Never fails: commerce and storage errors are logged and turned into
    /// apologetic replies.
    pub async fn handle(&self, chat_id: i64, input: Input) -> Outcome {
        let mut session = match self.sessions.get(chat_id).await {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(StoreError::Encoding(e)) => {
                // Old format or foreign value; the next write replaces it.
                log::warn!("Discarding undecodable session for chat {}: {}", chat_id, e);
                Session::default()
            }
            Err(e) => {
                log::error!("Failed to load session for chat {}: {}", chat_id, e);
                return Outcome::store_failure();
            }
        };

        let intent = Intent::parse(session.state, &input);
        log::debug!("Chat {} in state {:?}: {:?}", chat_id, session.state, intent);

        let mut outcome = match self.apply(chat_id, &mut session, intent, input.is_callback()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Commerce request failed for chat {}: {}", chat_id, e);
                return Outcome::commerce_failure(&e);
            }
        };

        if let Err(e) = self.sessions.put(chat_id, &session).await {
            log::error!("Failed to store session for chat {}: {}", chat_id, e);
            return Outcome::store_failure();
        }

        // Only a pressed button has a message to replace.
        if !input.is_callback() {
            outcome.delete_trigger = false;
        }
        outcome
    }

    async fn apply(
        &self,
        chat_id: i64,
        session: &mut Session,
        intent: Intent,
        from_button: bool,
    ) -> Result<Outcome, CommerceError> {
        let reference = chat_id.to_string();

        match intent {
            Intent::Start => {
                session.page = 0;
                self.show_catalog(session).await
            }
            Intent::ShowCatalog => self.show_catalog(session).await,
            Intent::NextPage => {
                session.page = session.page.saturating_add(1);
                self.show_catalog(session).await
            }
            Intent::PreviousPage => {
                session.page = session.page.saturating_sub(1);
                self.show_catalog(session).await
            }
            Intent::ShowProduct(product_id) => self.show_product(session, &product_id).await,
            Intent::AddToCart { product_id, quantity } => {
                self.commerce
                    .add_product_to_cart(&reference, &product_id, quantity)
                    .await?;
                session.record_added(&product_id, quantity);
                log::info!("Chat {} added {} x {} to cart", chat_id, quantity, product_id);

                if from_button {
                    return Ok(Outcome::notice(render::ADDED));
                }
                Ok(Outcome::reply(Reply::plain(&format!(
                    "Added {} x {} to your cart. You now have {} of it.",
                    quantity,
                    product_id,
                    session.quantity_of(&product_id)
                ))))
            }
            Intent::ShowCart => self.show_cart(session, &reference).await,
            Intent::RemoveItem(item_id) => {
                self.commerce.remove_cart_item(&reference, &item_id).await?;
                log::info!("Chat {} removed cart item {}", chat_id, item_id);
                self.show_cart(session, &reference).await
            }
            Intent::Checkout => {
                session.state = ConversationState::WaitingEmail;
                Ok(Outcome::screen(Reply::plain(render::ASK_EMAIL)))
            }
            Intent::Email(email) => {
                if !is_valid_email(&email) {
                    return Ok(Outcome::reply(Reply::plain(render::INVALID_EMAIL)));
                }
                let customer = self.commerce.create_customer(&email, DEFAULT_CUSTOMER_NAME).await?;
                log::info!("Chat {} checked out as customer {}", chat_id, customer.id);

                session.state = ConversationState::Start;
                session.page = 0;
                Ok(Outcome::reply(Reply::Text {
                    text: escape_markdown_v2(render::THANK_YOU),
                    keyboard: Some(render::back_to_menu_keyboard()),
                }))
            }
            Intent::Unknown => Ok(Outcome::reply(Reply::plain(render::USE_BUTTONS))),
        }
    }

    async fn show_catalog(&self, session: &mut Session) -> Result<Outcome, CommerceError> {
        let mut products = self.fetch_page(session.page).await?;
        if products.is_empty() && session.page > 0 {
            // The catalog shrank under us; start over.
            session.page = 0;
            products = self.fetch_page(0).await?;
        }

        session.state = ConversationState::ProductList;

        if products.is_empty() {
            return Ok(Outcome::screen(Reply::plain(render::EMPTY_CATALOG)));
        }

        let has_more = products.len() > PAGE_SIZE as usize;
        products.truncate(PAGE_SIZE as usize);

        Ok(Outcome::screen(Reply::markdown(
            render::SELECT_PRODUCT.to_string(),
            render::catalog_keyboard(&products, session.page, has_more),
        )))
    }

    /// One page plus one extra product to tell whether a next page exists.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, CommerceError> {
        self.commerce
            .list_products(PAGE_SIZE + 1, page.saturating_mul(PAGE_SIZE))
            .await
    }

    async fn show_product(&self, session: &mut Session, product_id: &str) -> Result<Outcome, CommerceError> {
        let product = self.commerce.get_product(product_id).await?;
        let keyboard = render::product_keyboard(&product);

        let image = match &product.main_image_id {
            Some(file_id) => match self.commerce.get_file(file_id).await {
                Ok(file) => Some(file.link),
                Err(e) => {
                    log::warn!("No image for product {} (file {}): {}", product.id, file_id, e);
                    None
                }
            },
            None => None,
        };

        session.state = ConversationState::ProductDescription;

        let reply = match image {
            Some(url) => Reply::Photo {
                url,
                caption: render::product_text(&product, true),
                keyboard: Some(keyboard),
            },
            None => Reply::markdown(render::product_text(&product, false), keyboard),
        };
        Ok(Outcome::screen(reply))
    }

    async fn show_cart(&self, session: &mut Session, reference: &str) -> Result<Outcome, CommerceError> {
        let cart = self.commerce.get_or_create_cart(reference).await?;
        let items = self.commerce.get_cart_items(reference).await?;

        session.sync_cart(&items);
        session.state = ConversationState::Cart;

        Ok(Outcome::screen(Reply::markdown(
            render::cart_text(&cart, &items),
            render::cart_keyboard(&items),
        )))
    }
}
