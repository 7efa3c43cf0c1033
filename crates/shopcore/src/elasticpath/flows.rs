//! Custom data: flows, their fields and entries.

use serde_json::{json, Map, Value};

use super::client::ElasticpathClient;
use super::error::CommerceError;
use super::models::{Entry, Envelope, Field, Flow, NewField, NewFlow};

impl ElasticpathClient {
    /// Create a flow.
    pub async fn create_flow(&self, flow: &NewFlow) -> Result<Flow, CommerceError> {
        self.post_data(self.endpoint(&["v2", "flows"])?, &Envelope { data: flow })
            .await
    }

    /// Create a field attached to `flow`.
    pub async fn create_field(&self, flow: &Flow, field: &NewField) -> Result<Field, CommerceError> {
        let payload = json!({
            "data": {
                "type": "field",
                "name": field.name,
                "slug": field.slug,
                "description": field.description,
                "field_type": field.field_type,
                "required": field.required,
                "enabled": field.enabled,
                "relationships": {
                    "flow": {"data": {"type": "flow", "id": flow.id}}
                }
            }
        });
        self.post_data(self.endpoint(&["v2", "fields"])?, &payload).await
    }

    /// Create an entry in the flow identified by `flow_slug`.
    ///
    /// `fields` maps field slugs to values.
    pub async fn create_entry(&self, flow_slug: &str, fields: Map<String, Value>) -> Result<Entry, CommerceError> {
        let mut data = fields;
        data.insert("type".to_string(), Value::String("entry".to_string()));
        self.post_data(
            self.endpoint(&["v2", "flows", flow_slug, "entries"])?,
            &json!({ "data": data }),
        )
        .await
    }
}
