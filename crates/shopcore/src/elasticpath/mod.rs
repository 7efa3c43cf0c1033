//! Elasticpath (Moltin) commerce API client
//!
//! The [`Commerce`] trait is the seam the bot dispatcher talks to;
//! [`ElasticpathClient`] implements it over HTTP and additionally exposes
//! the admin operations used by the catalog upload tools.

mod carts;
mod client;
mod customers;
mod error;
mod files;
mod flows;
pub mod models;
mod products;

use async_trait::async_trait;

pub use client::ElasticpathClient;
pub use error::CommerceError;
pub use models::{Cart, CartItem, Customer, Entry, Field, FieldType, File, Flow, NewField, NewFlow, NewProduct, Price, Product};

/// Catalog and cart operations the conversation needs.
#[async_trait]
pub trait Commerce: Send + Sync {
    /// One page of the catalog.
    async fn list_products(&self, limit: u32, offset: u32) -> Result<Vec<Product>, CommerceError>;

    async fn get_product(&self, product_id: &str) -> Result<Product, CommerceError>;

    async fn get_file(&self, file_id: &str) -> Result<File, CommerceError>;

    async fn get_or_create_cart(&self, reference: &str) -> Result<Cart, CommerceError>;

    async fn add_product_to_cart(&self, reference: &str, product_id: &str, quantity: u32) -> Result<(), CommerceError>;

    async fn get_cart_items(&self, reference: &str) -> Result<Vec<CartItem>, CommerceError>;

    async fn remove_cart_item(&self, reference: &str, item_id: &str) -> Result<(), CommerceError>;

    /// Checkout step: registers the buyer as a customer.
    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, CommerceError>;
}

#[async_trait]
impl Commerce for ElasticpathClient {
    async fn list_products(&self, limit: u32, offset: u32) -> Result<Vec<Product>, CommerceError> {
        self.get_products(limit, offset).await
    }

    async fn get_product(&self, product_id: &str) -> Result<Product, CommerceError> {
        ElasticpathClient::get_product(self, product_id).await
    }

    async fn get_file(&self, file_id: &str) -> Result<File, CommerceError> {
        ElasticpathClient::get_file(self, file_id).await
    }

    async fn get_or_create_cart(&self, reference: &str) -> Result<Cart, CommerceError> {
        ElasticpathClient::get_or_create_cart(self, reference).await
    }

    async fn add_product_to_cart(&self, reference: &str, product_id: &str, quantity: u32) -> Result<(), CommerceError> {
        ElasticpathClient::add_product_to_cart(self, reference, product_id, quantity).await
    }

    async fn get_cart_items(&self, reference: &str) -> Result<Vec<CartItem>, CommerceError> {
        ElasticpathClient::get_cart_items(self, reference).await
    }

    async fn remove_cart_item(&self, reference: &str, item_id: &str) -> Result<(), CommerceError> {
        ElasticpathClient::remove_cart_item(self, reference, item_id).await
    }

    async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, CommerceError> {
        ElasticpathClient::create_customer(self, email, name).await
    }
}
