//! Message texts and inline keyboards.
//!
//! Everything returned here is MarkdownV2; catalog data is escaped on the
//! way in.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use shopcore::config::catalog;
use shopcore::elasticpath::{Cart, CartItem, Product};

use super::intent::{AddToCartData, callback};
use crate::telegram::markdown::escape_markdown_v2 as esc;

pub const SELECT_PRODUCT: &str = "*Please select a product:*";
pub const EMPTY_CATALOG: &str = "The catalog is empty for now. Please come back later.";
pub const EMPTY_CART: &str = "Your cart is empty.";
pub const ASK_EMAIL: &str = "Please enter your email:";
pub const INVALID_EMAIL: &str = "That doesn't look like an email address. Please try again:";
pub const THANK_YOU: &str = "Thank you a lot! We will contact you soon.";
pub const ADDED: &str = "Added";
pub const USE_BUTTONS: &str = "Please use the buttons below, or send /start to open the catalog.";
pub const CLIENT_FAILURE: &str = "The shop couldn't process that request. Please check it and try again.";
pub const SERVER_FAILURE: &str = "The shop is temporarily unavailable. Please try again in a few minutes.";
pub const STORE_FAILURE: &str = "Something went wrong on our side. Please try again later.";

/// Longest description shown in a photo caption (Telegram caps captions at 1024).
const CAPTION_DESCRIPTION_CHARS: usize = 600;

/// One page of the catalog with navigation.
pub fn catalog_keyboard(products: &[Product], page: u32, has_more: bool) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|product| {
            vec![InlineKeyboardButton::callback(
                product.name.clone(),
                format!("{}{}", callback::PRODUCT_PREFIX, product.id),
            )]
        })
        .collect();

    let mut navigation = Vec::new();
    if page > 0 {
        navigation.push(InlineKeyboardButton::callback("<<<", callback::PREVIOUS_PAGE));
    }
    if has_more {
        navigation.push(InlineKeyboardButton::callback(">>>", callback::NEXT_PAGE));
    }
    if !navigation.is_empty() {
        rows.push(navigation);
    }

    InlineKeyboardMarkup::new(rows)
}

/// Product card text; `for_caption` shortens long descriptions.
pub fn product_text(product: &Product, for_caption: bool) -> String {
    let description = if for_caption {
        truncate_chars(&product.description, CAPTION_DESCRIPTION_CHARS)
    } else {
        product.description.clone()
    };

    format!(
        "*{}*\n\n*Price*: {}\n*Availability*: {} {}\n\n{}\n",
        esc(&product.name),
        esc(&product.formatted_price),
        esc(&product.stock_level.to_string()),
        esc(&product.stock_availability),
        esc(&description),
    )
}

pub fn product_keyboard(product: &Product) -> InlineKeyboardMarkup {
    let add_buttons = catalog::ADD_AMOUNTS
        .iter()
        .map(|&amount| {
            let data = AddToCartData {
                id: product.id.clone(),
                amount,
            };
            InlineKeyboardButton::callback(format!("Add {}", amount), data.to_callback())
        })
        .collect();

    InlineKeyboardMarkup::new(vec![
        add_buttons,
        vec![InlineKeyboardButton::callback("Back to menu", callback::PRODUCT_LIST)],
        vec![InlineKeyboardButton::callback("Show cart", callback::SHOW_CART)],
    ])
}

pub fn cart_text(cart: &Cart, items: &[CartItem]) -> String {
    if items.is_empty() {
        return esc(EMPTY_CART);
    }

    let mut text = String::from("*Items in cart*:\n");
    for item in items {
        text.push_str(&format!(
            "*{}*\n*Price per unit*: {}\n*Quantity*: {}\n{}\n\n",
            esc(&item.name),
            esc(&item.formatted_price),
            item.quantity,
            esc(&item.description),
        ));
    }
    text.push_str(&format!("*Total price*: {}", esc(&cart.formatted_price)));
    text
}

pub fn cart_keyboard(items: &[CartItem]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = items
        .iter()
        .map(|item| {
            vec![InlineKeyboardButton::callback(
                format!("Remove {}", item.name),
                format!("{}{}", callback::REMOVE_PREFIX, item.id),
            )]
        })
        .collect();

    if !items.is_empty() {
        rows.push(vec![InlineKeyboardButton::callback("Checkout", callback::CHECKOUT)]);
    }
    rows.push(vec![InlineKeyboardButton::callback("Back to menu", callback::PRODUCT_LIST)]);

    InlineKeyboardMarkup::new(rows)
}

/// Single "Back to menu" button.
pub fn back_to_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Back to menu",
        callback::PRODUCT_LIST,
    )]])
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
