use serde_json::json;

use super::client::ElasticpathClient;
use super::error::CommerceError;
use super::models::{Envelope, File, NewProduct, Product};

impl ElasticpathClient {
    /// Get product by id.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, CommerceError> {
        self.get_data(self.endpoint(&["v2", "products", product_id])?, &[]).await
    }

    /// Get one page of products using limit/offset pagination.
    pub async fn get_products(&self, limit: u32, offset: u32) -> Result<Vec<Product>, CommerceError> {
        self.get_data(
            self.endpoint(&["v2", "products"])?,
            &[("page[limit]", limit.to_string()), ("page[offset]", offset.to_string())],
        )
        .await
    }

    /// Create a product in the catalog.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, CommerceError> {
        self.post_data(self.endpoint(&["v2", "products"])?, &Envelope { data: product })
            .await
    }

    /// Make an uploaded file the product's main image.
    pub async fn add_main_image_to_product(&self, product_id: &str, file: &File) -> Result<(), CommerceError> {
        self.post_ignore(
            self.endpoint(&["v2", "products", product_id, "relationships", "main-image"])?,
            &json!({"data": {"type": "main_image", "id": file.id}}),
        )
        .await
    }
}
