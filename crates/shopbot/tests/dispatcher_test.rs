//! Conversation flows through the dispatcher, without Telegram.

mod common;

use std::sync::Arc;

use common::{CHAT_ID, CorruptStore, FailingStore, FakeCommerce, Failure, Harness, buttons, texts};
use pretty_assertions::assert_eq;
use shopbot::dispatch::intent::callback;
use shopbot::dispatch::render;
use shopbot::telegram::markdown::escape_markdown_v2;
use shopbot::{Input, Reply, ShopDispatcher};
use shopcore::storage::{CartLine, ConversationState, Session};

fn line(product_id: &str, quantity: u32) -> CartLine {
    CartLine {
        product_id: product_id.to_string(),
        quantity,
    }
}

#[tokio::test]
async fn test_first_message_opens_catalog() {
    let h = Harness::new(FakeCommerce::with_products(10));

    let outcome = h.text("hello").await;

    assert_eq!(texts(&outcome), vec![render::SELECT_PRODUCT.to_string()]);
    let rows = buttons(&outcome);
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0], vec!["Pizza 1".to_string()]);
    assert_eq!(rows[8], vec![">>>".to_string()]);
    assert!(!outcome.delete_trigger);
    assert_eq!(h.commerce.calls(), vec!["list_products(9, 0)".to_string()]);
    assert_eq!(h.session().await.state, ConversationState::ProductList);
}

#[tokio::test]
async fn test_paging_through_catalog() {
    let h = Harness::new(FakeCommerce::with_products(10));
    h.text("/start").await;

    let outcome = h.press(callback::NEXT_PAGE).await;
    let rows = buttons(&outcome);
    assert_eq!(
        rows,
        vec![
            vec!["Pizza 9".to_string()],
            vec!["Pizza 10".to_string()],
            vec!["<<<".to_string()],
        ]
    );
    assert!(outcome.delete_trigger);
    assert_eq!(h.session().await.page, 1);

    h.press(callback::PREVIOUS_PAGE).await;
    let outcome = h.press(callback::PREVIOUS_PAGE).await;
    assert_eq!(h.session().await.page, 0);
    assert_eq!(buttons(&outcome).last(), Some(&vec![">>>".to_string()]));
}

#[tokio::test]
async fn test_start_resets_page() {
    let h = Harness::new(FakeCommerce::with_products(20));
    h.set_session(Session {
        state: ConversationState::Cart,
        page: 2,
        cart: vec![line("p1", 1)],
    })
    .await;

    h.text("/start").await;

    let session = h.session().await;
    assert_eq!(session.page, 0);
    assert_eq!(session.state, ConversationState::ProductList);
    assert_eq!(session.cart, vec![line("p1", 1)]);
}

#[tokio::test]
async fn test_empty_catalog() {
    let h = Harness::new(FakeCommerce::with_products(0));

    let outcome = h.text("/start").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::EMPTY_CATALOG)]);
}

#[tokio::test]
async fn test_product_without_image_is_text() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.text("/start").await;

    let outcome = h.press("product:p2").await;

    match &outcome.replies[..] {
        [Reply::Text { text, .. }] => {
            assert!(text.starts_with("*Pizza 2*\n\n*Price*: 500\\.00 ₽\n*Availability*: 5 in\\-stock"));
        }
        other => panic!("unexpected replies: {:?}", other),
    }
    assert_eq!(
        buttons(&outcome),
        vec![
            vec!["Add 1".to_string()],
            vec!["Back to menu".to_string()],
            vec!["Show cart".to_string()],
        ]
    );
    assert!(outcome.delete_trigger);
    assert_eq!(h.session().await.state, ConversationState::ProductDescription);
}

#[tokio::test]
async fn test_product_with_image_is_photo() {
    let h = Harness::new(FakeCommerce::with_products(3).with_image("p1", "https://files.example.com/p1.jpg"));

    let outcome = h.press("product:p1").await;

    match &outcome.replies[..] {
        [Reply::Photo { url, caption, .. }] => {
            assert_eq!(url, "https://files.example.com/p1.jpg");
            assert!(caption.starts_with("*Pizza 1*"));
        }
        other => panic!("unexpected replies: {:?}", other),
    }
}

#[tokio::test]
async fn test_add_button_answers_with_notice() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.press("product:p1").await;

    let outcome = h.press(r#"add:{"id":"p1","amount":1}"#).await;

    assert_eq!(outcome.notice.as_deref(), Some(render::ADDED));
    assert!(outcome.replies.is_empty());
    assert!(!outcome.delete_trigger);

    let session = h.session().await;
    assert_eq!(session.state, ConversationState::ProductDescription);
    assert_eq!(session.cart, vec![line("p1", 1)]);
}

#[tokio::test]
async fn test_add_product_text_command() {
    let h = Harness::new(FakeCommerce::with_products(3));

    let outcome = h.text("add product 123 qty 2").await;

    assert!(
        h.commerce
            .calls()
            .contains(&format!("add_product_to_cart({}, 123, 2)", CHAT_ID))
    );
    assert_eq!(h.session().await.cart, vec![line("123", 2)]);
    assert_eq!(
        texts(&outcome),
        vec![escape_markdown_v2("Added 2 x 123 to your cart. You now have 2 of it.")]
    );

    h.text("add product 123 qty 1").await;
    assert_eq!(h.session().await.cart, vec![line("123", 3)]);
}

#[tokio::test]
async fn test_cart_view_and_removal() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.text("add product p1 qty 2").await;
    h.text("add product p2 qty 1").await;

    let outcome = h.press(callback::SHOW_CART).await;
    let text = &texts(&outcome)[0];
    assert!(text.starts_with("*Items in cart*:\n*Pizza 1*\n"));
    assert!(text.ends_with("*Total price*: 1500\\.00 ₽"));
    assert_eq!(
        buttons(&outcome),
        vec![
            vec!["Remove Pizza 1".to_string()],
            vec!["Remove Pizza 2".to_string()],
            vec!["Checkout".to_string()],
            vec!["Back to menu".to_string()],
        ]
    );
    assert_eq!(h.session().await.state, ConversationState::Cart);

    let outcome = h.press("remove:item-p1").await;
    assert_eq!(buttons(&outcome)[0], vec!["Remove Pizza 2".to_string()]);
    assert_eq!(h.session().await.cart, vec![line("p2", 1)]);
}

#[tokio::test]
async fn test_cart_command_resyncs_mirror() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.set_session(Session {
        state: ConversationState::ProductList,
        page: 0,
        cart: vec![line("stale", 9)],
    })
    .await;

    let outcome = h.text("/cart").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::EMPTY_CART)]);
    assert_eq!(h.session().await.cart, Vec::<CartLine>::new());
}

#[tokio::test]
async fn test_checkout_with_valid_email() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.text("add product p1 qty 1").await;
    h.press(callback::SHOW_CART).await;

    let outcome = h.press(callback::CHECKOUT).await;
    assert_eq!(texts(&outcome), vec![render::ASK_EMAIL.to_string()]);
    assert_eq!(h.session().await.state, ConversationState::WaitingEmail);

    let outcome = h.text("ann@example.com").await;
    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::THANK_YOU)]);
    assert_eq!(
        h.commerce.customers(),
        vec![("ann@example.com".to_string(), "Anonymous".to_string())]
    );

    let session = h.session().await;
    assert_eq!(session.state, ConversationState::Start);
    assert_eq!(session.cart, vec![line("p1", 1)]);
}

#[tokio::test]
async fn test_invalid_email_is_asked_again() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.set_session(Session {
        state: ConversationState::WaitingEmail,
        ..Session::default()
    })
    .await;

    let outcome = h.text("not an email").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::INVALID_EMAIL)]);
    assert!(h.commerce.customers().is_empty());
    assert_eq!(h.session().await.state, ConversationState::WaitingEmail);
}

#[tokio::test]
async fn test_server_error_on_checkout_keeps_session() {
    let h = Harness::new(FakeCommerce::with_products(3));
    let before = Session {
        state: ConversationState::WaitingEmail,
        page: 0,
        cart: vec![line("p1", 2)],
    };
    h.set_session(before.clone()).await;
    h.commerce.fail_with(Some(Failure::Server));

    let outcome = h.text("ann@example.com").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::SERVER_FAILURE)]);
    assert_eq!(h.session().await, before);
}

#[tokio::test]
async fn test_client_error_on_product_lookup_keeps_state() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.text("/start").await;

    let outcome = h.press("product:missing").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::CLIENT_FAILURE)]);
    assert_eq!(h.session().await.state, ConversationState::ProductList);
}

#[tokio::test]
async fn test_failed_add_does_not_touch_cart() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.commerce.fail_with(Some(Failure::Client));

    let outcome = h.text("add product p1 qty 1").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::CLIENT_FAILURE)]);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_stray_text_gets_hint() {
    let h = Harness::new(FakeCommerce::with_products(3));
    h.text("/start").await;

    let outcome = h.text("what now?").await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::USE_BUTTONS)]);
    assert_eq!(h.session().await.state, ConversationState::ProductList);
}

#[tokio::test]
async fn test_store_read_failure_replies_generic_error() {
    let commerce = Arc::new(FakeCommerce::with_products(3));
    let dispatcher = ShopDispatcher::new(
        commerce.clone(),
        Arc::new(FailingStore {
            fail_get: true,
            fail_put: false,
        }),
    );

    let outcome = dispatcher.handle(CHAT_ID, Input::Text("/start".to_string())).await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::STORE_FAILURE)]);
    assert!(commerce.calls().is_empty());
}

#[tokio::test]
async fn test_store_write_failure_replies_generic_error() {
    let dispatcher = ShopDispatcher::new(
        Arc::new(FakeCommerce::with_products(3)),
        Arc::new(FailingStore {
            fail_get: false,
            fail_put: true,
        }),
    );

    let outcome = dispatcher.handle(CHAT_ID, Input::Callback(callback::PRODUCT_LIST.to_string())).await;

    assert_eq!(texts(&outcome), vec![escape_markdown_v2(render::STORE_FAILURE)]);
    assert!(!outcome.delete_trigger);
}

#[tokio::test]
async fn test_undecodable_session_starts_over() {
    let store = Arc::new(CorruptStore::default());
    let dispatcher = ShopDispatcher::new(Arc::new(FakeCommerce::with_products(3)), store.clone());

    let outcome = dispatcher.handle(CHAT_ID, Input::Text("/start".to_string())).await;

    assert_eq!(texts(&outcome), vec![render::SELECT_PRODUCT.to_string()]);
    let stored = store.stored().await.unwrap();
    assert_eq!(stored.state, ConversationState::ProductList);
    assert_eq!(stored.page, 0);

    let outcome = dispatcher.handle(CHAT_ID, Input::Callback("product:p2".to_string())).await;
    assert!(outcome.replies[0].text().starts_with("*Pizza 2*"));
}
