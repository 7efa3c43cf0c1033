//! Interpreting user input as shop actions.
//!
//! Callback data is prefixed so that a button means the same thing whatever
//! state the chat is in (old keyboards keep working). Free text only means
//! something in a few places: the commands, the "add product" shortcut and
//! the e-mail prompt.

use lazy_regex::regex_captures;
use serde::{Deserialize, Serialize};

use shopcore::storage::ConversationState;

use super::Input;

/// Callback data values and prefixes
pub mod callback {
    pub const PRODUCT_LIST: &str = "nav:catalog";
    pub const SHOW_CART: &str = "nav:cart";
    pub const CHECKOUT: &str = "nav:checkout";
    pub const NEXT_PAGE: &str = "nav:next";
    pub const PREVIOUS_PAGE: &str = "nav:prev";

    pub const PRODUCT_PREFIX: &str = "product:";
    pub const REMOVE_PREFIX: &str = "remove:";
    pub const ADD_PREFIX: &str = "add:";
}

/// Payload of an "Add N" button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartData {
    pub id: String,
    pub amount: u32,
}

impl AddToCartData {
    /// Callback data for this payload (`add:{"id":..,"amount":..}`).
    pub fn to_callback(&self) -> String {
        // Serializing two plain fields cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{}{}", callback::ADD_PREFIX, json)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `/start`, or anything sent before the conversation started
    Start,
    ShowCatalog,
    NextPage,
    PreviousPage,
    ShowProduct(String),
    AddToCart { product_id: String, quantity: u32 },
    ShowCart,
    RemoveItem(String),
    Checkout,
    Email(String),
    /// Input that means nothing in the current state
    Unknown,
}

impl Intent {
    /// Classifies `input` for a chat in `state`.
    pub fn parse(state: ConversationState, input: &Input) -> Self {
        match input {
            Input::Callback(data) => Self::from_callback(data),
            Input::Text(text) => Self::from_text(state, text),
        }
    }

    fn from_callback(data: &str) -> Self {
        match data {
            callback::PRODUCT_LIST => return Self::ShowCatalog,
            callback::SHOW_CART => return Self::ShowCart,
            callback::CHECKOUT => return Self::Checkout,
            callback::NEXT_PAGE => return Self::NextPage,
            callback::PREVIOUS_PAGE => return Self::PreviousPage,
            _ => {}
        }

        if let Some(id) = non_empty_suffix(data, callback::PRODUCT_PREFIX) {
            return Self::ShowProduct(id.to_string());
        }
        if let Some(item_id) = non_empty_suffix(data, callback::REMOVE_PREFIX) {
            return Self::RemoveItem(item_id.to_string());
        }
        if let Some(json) = data.strip_prefix(callback::ADD_PREFIX) {
            return match serde_json::from_str::<AddToCartData>(json) {
                Ok(add) if add.amount > 0 && !add.id.is_empty() => Self::AddToCart {
                    product_id: add.id,
                    quantity: add.amount,
                },
                Ok(_) => Self::Unknown,
                Err(e) => {
                    log::warn!("Malformed add-to-cart callback {:?}: {}", data, e);
                    Self::Unknown
                }
            };
        }

        log::debug!("Unrecognized callback data: {:?}", data);
        Self::Unknown
    }

    fn from_text(state: ConversationState, text: &str) -> Self {
        let text = text.trim();

        match command_name(text) {
            Some("start") => return Self::Start,
            Some("cart") => return Self::ShowCart,
            _ => {}
        }

        if let Some(intent) = parse_add_command(text) {
            return intent;
        }

        match state {
            ConversationState::Start => Self::Start,
            ConversationState::WaitingEmail => Self::Email(text.to_string()),
            _ => Self::Unknown,
        }
    }
}

/// `name` of a leading `/name` or `/name@botname`.
fn command_name(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?.strip_prefix('/')?;
    first.split('@').next().filter(|name| !name.is_empty())
}

/// `add product <id> qty <n>`, case-insensitive, `n` at least 1.
fn parse_add_command(text: &str) -> Option<Intent> {
    let (_, product_id, quantity) = regex_captures!(r"(?i)^add\s+product\s+(\S+)\s+qty\s+(\d+)$", text)?;
    let quantity: u32 = quantity.parse().ok().filter(|qty| *qty > 0)?;
    Some(Intent::AddToCart {
        product_id: product_id.to_string(),
        quantity,
    })
}

fn non_empty_suffix<'a>(data: &'a str, prefix: &str) -> Option<&'a str> {
    data.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

/// Loose e-mail shape check: one `@`, no spaces, a dot in the domain.
pub fn is_valid_email(text: &str) -> bool {
    lazy_regex::regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(state: ConversationState, s: &str) -> Intent {
        Intent::parse(state, &Input::Text(s.to_string()))
    }

    fn cb(s: &str) -> Intent {
        Intent::parse(ConversationState::Cart, &Input::Callback(s.to_string()))
    }

    #[test]
    fn test_start_command_from_any_state() {
        for state in [
            ConversationState::Start,
            ConversationState::ProductList,
            ConversationState::Cart,
            ConversationState::WaitingEmail,
        ] {
            assert_eq!(text(state, "/start"), Intent::Start);
            assert_eq!(text(state, "/start@ShopBot"), Intent::Start);
        }
    }

    #[test]
    fn test_cart_command() {
        assert_eq!(text(ConversationState::ProductDescription, "/cart"), Intent::ShowCart);
    }

    #[test]
    fn test_any_text_in_start_state_opens_catalog() {
        assert_eq!(text(ConversationState::Start, "hello"), Intent::Start);
    }

    #[test]
    fn test_stray_text_elsewhere_is_unknown() {
        assert_eq!(text(ConversationState::ProductList, "hello"), Intent::Unknown);
        assert_eq!(text(ConversationState::Cart, "/help"), Intent::Unknown);
    }

    #[test]
    fn test_text_while_waiting_email_is_email() {
        assert_eq!(
            text(ConversationState::WaitingEmail, "  ann@example.com "),
            Intent::Email("ann@example.com".to_string())
        );
    }

    #[test]
    fn test_add_product_command() {
        assert_eq!(
            text(ConversationState::Start, "add product 123 qty 2"),
            Intent::AddToCart {
                product_id: "123".to_string(),
                quantity: 2
            }
        );
        assert_eq!(
            text(ConversationState::WaitingEmail, "Add Product abc-1 QTY 10"),
            Intent::AddToCart {
                product_id: "abc-1".to_string(),
                quantity: 10
            }
        );
    }

    #[test]
    fn test_add_product_command_rejects_zero_and_garbage() {
        assert_eq!(text(ConversationState::Cart, "add product 123 qty 0"), Intent::Unknown);
        assert_eq!(text(ConversationState::Cart, "add product 123 qty lots"), Intent::Unknown);
        assert_eq!(text(ConversationState::Cart, "add product qty 2"), Intent::Unknown);
    }

    #[test]
    fn test_navigation_callbacks() {
        assert_eq!(cb(callback::PRODUCT_LIST), Intent::ShowCatalog);
        assert_eq!(cb(callback::SHOW_CART), Intent::ShowCart);
        assert_eq!(cb(callback::CHECKOUT), Intent::Checkout);
        assert_eq!(cb(callback::NEXT_PAGE), Intent::NextPage);
        assert_eq!(cb(callback::PREVIOUS_PAGE), Intent::PreviousPage);
    }

    #[test]
    fn test_prefixed_callbacks() {
        assert_eq!(cb("product:p-1"), Intent::ShowProduct("p-1".to_string()));
        assert_eq!(cb("remove:item-9"), Intent::RemoveItem("item-9".to_string()));
        assert_eq!(cb("product:"), Intent::Unknown);
        assert_eq!(cb("something else"), Intent::Unknown);
    }

    #[test]
    fn test_add_callback_payload() {
        let data = AddToCartData {
            id: "p-1".to_string(),
            amount: 1,
        }
        .to_callback();
        assert_eq!(data, r#"add:{"id":"p-1","amount":1}"#);
        assert_eq!(
            cb(&data),
            Intent::AddToCart {
                product_id: "p-1".to_string(),
                quantity: 1
            }
        );
        assert_eq!(cb("add:{not json"), Intent::Unknown);
        assert_eq!(cb(r#"add:{"id":"p-1","amount":0}"#), Intent::Unknown);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email("ann@example"));
        assert!(!is_valid_email("ann@@example.com"));
        assert!(!is_valid_email("ann @example.com"));
    }
}
