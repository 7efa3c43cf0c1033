use serde_json::json;

use super::client::ElasticpathClient;
use super::error::CommerceError;
use super::models::{Cart, CartItem, RawCart};

impl ElasticpathClient {
    /// Get cart by reference. Elasticpath creates the cart on first access.
    pub async fn get_or_create_cart(&self, reference: &str) -> Result<Cart, CommerceError> {
        let raw: RawCart = self.get_data(self.endpoint(&["v2", "carts", reference])?, &[]).await?;
        Ok(raw.into_cart(reference))
    }

    /// Add `quantity` items of a product to a cart.
    pub async fn add_product_to_cart(
        &self,
        reference: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let payload = json!({
            "data": {
                "type": "cart_item",
                "id": product_id,
                "quantity": quantity,
            }
        });
        self.post_ignore(self.endpoint(&["v2", "carts", reference, "items"])?, &payload)
            .await
    }

    /// Get contents of a cart.
    pub async fn get_cart_items(&self, reference: &str) -> Result<Vec<CartItem>, CommerceError> {
        self.get_data(self.endpoint(&["v2", "carts", reference, "items"])?, &[])
            .await
    }

    /// Remove one line from a cart.
    pub async fn remove_cart_item(&self, reference: &str, item_id: &str) -> Result<(), CommerceError> {
        self.delete(self.endpoint(&["v2", "carts", reference, "items", item_id])?)
            .await
    }
}
