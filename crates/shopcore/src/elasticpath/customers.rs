use serde_json::json;

use super::client::ElasticpathClient;
use super::error::CommerceError;
use super::models::Customer;

impl ElasticpathClient {
    /// Create customer in the shop. Elasticpath validates the e-mail and
    /// answers 422 when it is malformed or already taken.
    pub async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, CommerceError> {
        let payload = json!({
            "data": {
                "type": "customer",
                "name": name,
                "email": email,
            }
        });
        self.post_data(self.endpoint(&["v2", "customers"])?, &payload).await
    }
}
