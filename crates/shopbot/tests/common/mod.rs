//! Common test utilities
//!
//! An in-memory commerce backend that records every call, a session store
//! that can be told to fail, and helpers to build a dispatcher around them.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use shopbot::{Outcome, Reply, ShopDispatcher};
use shopcore::elasticpath::{Cart, CartItem, Customer, File, Product};
use shopcore::storage::{Session, SessionStore, StoreError};
use shopcore::{Commerce, CommerceError, MemorySessionStore};

pub const CHAT_ID: i64 = 42;

/// Failure the fake backend should answer every call with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// 4xx, e.g. unknown product or rejected e-mail
    Client,
    /// 5xx
    Server,
}

impl Failure {
    fn error(self) -> CommerceError {
        match self {
            Failure::Client => CommerceError::Client {
                status: 422,
                detail: "Validation failed".to_string(),
            },
            Failure::Server => CommerceError::Server {
                status: 503,
                detail: "Service Unavailable".to_string(),
            },
        }
    }
}

#[derive(Default)]
pub struct FakeCommerce {
    products: Vec<Product>,
    files: HashMap<String, File>,
    items: Mutex<Vec<CartItem>>,
    calls: Mutex<Vec<String>>,
    customers: Mutex<Vec<(String, String)>>,
    failure: Mutex<Option<Failure>>,
}

impl FakeCommerce {
    /// Catalog of `count` products named "Pizza 1", "Pizza 2", ...
    pub fn with_products(count: usize) -> Self {
        Self {
            products: (1..=count).map(|n| product(&format!("p{}", n), &format!("Pizza {}", n))).collect(),
            ..Self::default()
        }
    }

    /// Gives product `product_id` a main image served from `link`.
    pub fn with_image(mut self, product_id: &str, link: &str) -> Self {
        let file_id = format!("file-{}", product_id);
        if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
            product.main_image_id = Some(file_id.clone());
        }
        self.files.insert(
            file_id.clone(),
            File {
                id: file_id,
                link: link.to_string(),
            },
        );
        self
    }

    /// Makes every following call fail (or succeed again with `None`).
    pub fn fail_with(&self, failure: Option<Failure>) {
        *self.failure.lock().unwrap() = failure;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn customers(&self) -> Vec<(String, String)> {
        self.customers.lock().unwrap().clone()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.items.lock().unwrap().clone()
    }

    fn enter(&self, call: String) -> Result<(), CommerceError> {
        self.calls.lock().unwrap().push(call);
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }

    fn not_found(what: &str) -> CommerceError {
        CommerceError::Client {
            status: 404,
            detail: format!("{} not found", what),
        }
    }
}

#[async_trait]
impl Commerce for FakeCommerce {
    async fn list_products(&self, limit: u32, offset: u32) -> Result<Vec<Product>, CommerceError> {
        self.enter(format!("list_products({}, {})", limit, offset))?;
        Ok(self
            .products
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_product(&self, product_id: &str) -> Result<Product, CommerceError> {
        self.enter(format!("get_product({})", product_id))?;
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| Self::not_found("product"))
    }

    async fn get_file(&self, file_id: &str) -> Result<File, CommerceError> {
        self.enter(format!("get_file({})", file_id))?;
        self.files.get(file_id).cloned().ok_or_else(|| Self::not_found("file"))
    }

    async fn get_or_create_cart(&self, reference: &str) -> Result<Cart, CommerceError> {
        self.enter(format!("get_or_create_cart({})", reference))?;
        let total: u32 = self.items.lock().unwrap().iter().map(|i| i.quantity * 500).sum();
        Ok(Cart {
            id: format!("cart-{}", reference),
            reference: reference.to_string(),
            formatted_price: format!("{}.00 ₽", total),
        })
    }

    async fn add_product_to_cart(&self, reference: &str, product_id: &str, quantity: u32) -> Result<(), CommerceError> {
        self.enter(format!("add_product_to_cart({}, {}, {})", reference, product_id, quantity))?;
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity += quantity,
            None => {
                let name = self
                    .products
                    .iter()
                    .find(|p| p.id == product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| product_id.to_string());
                items.push(CartItem {
                    id: format!("item-{}", product_id),
                    product_id: product_id.to_string(),
                    name,
                    description: "Tasty".to_string(),
                    quantity,
                    formatted_price: "500.00 ₽".to_string(),
                });
            }
        }
        Ok(())
    }

    async fn get_cart_items(&self, reference: &str) -> Result<Vec<CartItem>, CommerceError> {
        self.enter(format!("get_cart_items({})", reference))?;
        Ok(self.items())
    }

    async fn remove_cart_item(&self, reference: &str, item_id: &str) -> Result<(), CommerceError> {
        self.enter(format!("remove_cart_item({}, {})", reference, item_id))?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != item_id);
        if items.len() == before {
            return Err(Self::not_found("cart item"));
        }
        Ok(())
    }

    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, CommerceError> {
        self.enter(format!("create_customer({}, {})", email, name))?;
        self.customers.lock().unwrap().push((email.to_string(), name.to_string()));
        Ok(Customer {
            id: "customer-1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Session store whose reads and/or writes fail.
pub struct FailingStore {
    pub fail_get: bool,
    pub fail_put: bool,
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn get(&self, _chat_id: i64) -> Result<Option<Session>, StoreError> {
        if self.fail_get {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(None)
    }

    async fn put(&self, _chat_id: i64, _session: &Session) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Store holding a value that no longer decodes as a [`Session`] until
/// something overwrites it.
#[derive(Default)]
pub struct CorruptStore {
    inner: MemorySessionStore,
}

impl CorruptStore {
    pub async fn stored(&self) -> Option<Session> {
        self.inner.get(CHAT_ID).await.unwrap()
    }
}

#[async_trait]
impl SessionStore for CorruptStore {
    async fn get(&self, chat_id: i64) -> Result<Option<Session>, StoreError> {
        match self.inner.get(chat_id).await? {
            Some(session) => Ok(Some(session)),
            None => Err(serde_json::from_str::<Session>(r#"{"state":"renamed_state"}"#)
                .unwrap_err()
                .into()),
        }
    }

    async fn put(&self, chat_id: i64, session: &Session) -> Result<(), StoreError> {
        self.inner.put(chat_id, session).await
    }
}

/// Dispatcher plus handles on its backend and store.
pub struct Harness {
    pub dispatcher: ShopDispatcher,
    pub commerce: Arc<FakeCommerce>,
    pub store: MemorySessionStore,
}

impl Harness {
    pub fn new(commerce: FakeCommerce) -> Self {
        let commerce = Arc::new(commerce);
        let store = MemorySessionStore::new();
        let dispatcher = ShopDispatcher::new(commerce.clone(), Arc::new(store.clone()));
        Self {
            dispatcher,
            commerce,
            store,
        }
    }

    pub async fn session(&self) -> Session {
        self.store.get(CHAT_ID).await.unwrap().unwrap_or_default()
    }

    pub async fn set_session(&self, session: Session) {
        self.store.put(CHAT_ID, &session).await.unwrap();
    }

    pub async fn text(&self, text: &str) -> Outcome {
        self.dispatcher
            .handle(CHAT_ID, shopbot::Input::Text(text.to_string()))
            .await
    }

    pub async fn press(&self, data: &str) -> Outcome {
        self.dispatcher
            .handle(CHAT_ID, shopbot::Input::Callback(data.to_string()))
            .await
    }
}

pub fn product(id: &str, name: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} with cheese", name),
        formatted_price: "500.00 ₽".to_string(),
        stock_level: 5,
        stock_availability: "in-stock".to_string(),
        main_image_id: None,
    }
}

/// Texts (or captions) of all replies.
pub fn texts(outcome: &Outcome) -> Vec<String> {
    outcome.replies.iter().map(|r| r.text().to_string()).collect()
}

/// Button labels of the first reply, row by row.
pub fn buttons(outcome: &Outcome) -> Vec<Vec<String>> {
    outcome
        .replies
        .first()
        .and_then(Reply::keyboard)
        .map(|kb| {
            kb.inline_keyboard
                .iter()
                .map(|row| row.iter().map(|b| b.text.clone()).collect())
                .collect()
        })
        .unwrap_or_default()
}
