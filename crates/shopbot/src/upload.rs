//! Catalog administration: bulk product and pizzeria uploads.
//!
//! These are one-shot operator tools run from the CLI. Each record is
//! uploaded on its own; a failing record is logged and skipped so one bad
//! line does not abort a long import.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use shopcore::elasticpath::{FieldType, Flow, NewField, NewFlow, NewProduct, Price, Product};
use shopcore::{AppError, AppResult, ElasticpathClient};

/// Currency for uploaded prices unless overridden
pub const DEFAULT_CURRENCY: &str = "RUB";

/// Field slugs of the shops flow: (slug, type, description)
pub const SHOP_FIELDS: [(&str, FieldType, &str); 4] = [
    ("Address", FieldType::String, "Full street address"),
    ("Alias", FieldType::String, "Short shop name"),
    ("Longitude", FieldType::Float, "Longitude of the shop"),
    ("Latitude", FieldType::Float, "Latitude of the shop"),
];

/// Product as it appears in the import file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in the smallest currency unit
    pub price: i64,
    #[serde(default)]
    pub product_image: Option<ImageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Shop (pizzeria) as it appears in the import file.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopRecord {
    pub alias: String,
    pub address: ShopAddress,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopAddress {
    pub full: String,
}

/// Coordinates may come as numbers or as numeric strings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    #[serde(deserialize_with = "number_or_string")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub lon: f64,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Counts of a finished upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub created: usize,
    pub failed: usize,
}

impl UploadReport {
    fn record<T>(&mut self, what: &str, result: AppResult<T>) {
        match result {
            Ok(_) => self.created += 1,
            Err(e) => {
                log::error!("Failed to upload {}: {}", what, e);
                self.failed += 1;
            }
        }
    }
}

/// Reads a JSON array of records from `path`.
pub async fn read_records<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Lowercase slug of `name`: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// File name for an image downloaded from `url`.
fn image_file_name(url: &str, fallback: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("{}.jpg", fallback))
}

/// Creates every product of `records`, attaching its main image.
pub async fn upload_products(
    client: &ElasticpathClient,
    http: &reqwest::Client,
    records: &[ProductRecord],
    currency: &str,
) -> UploadReport {
    let mut report = UploadReport::default();
    for record in records {
        let result = upload_product(client, http, record, currency).await;
        if let Ok(product) = &result {
            log::info!("Created product {:?} ({})", product.name, product.id);
        }
        report.record(&format!("product {:?}", record.name), result);
    }
    report
}

async fn upload_product(
    client: &ElasticpathClient,
    http: &reqwest::Client,
    record: &ProductRecord,
    currency: &str,
) -> AppResult<Product> {
    let slug = slugify(&record.name);
    if slug.is_empty() {
        return Err(AppError::Anyhow(anyhow::anyhow!(
            "product name {:?} has no usable characters for a slug",
            record.name
        )));
    }

    let product = client
        .create_product(&NewProduct {
            name: record.name.clone(),
            slug: slug.clone(),
            sku: slug,
            description: record.description.clone(),
            manage_stock: false,
            price: vec![Price {
                amount: record.price,
                currency: currency.to_string(),
                includes_tax: true,
            }],
            status: "live".to_string(),
            commodity_type: "physical".to_string(),
        })
        .await?;

    if let Some(image) = &record.product_image {
        let content = http
            .get(&image.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec();
        let file = client
            .create_file(&image_file_name(&image.url, &product.id), content, true)
            .await?;
        client.add_main_image_to_product(&product.id, &file).await?;
        log::debug!("Attached image {} to product {}", file.id, product.id);
    }

    Ok(product)
}

/// Creates one entry of the `flow_slug` flow per shop.
pub async fn upload_shops(client: &ElasticpathClient, records: &[ShopRecord], flow_slug: &str) -> UploadReport {
    let mut report = UploadReport::default();
    for record in records {
        let result = client
            .create_entry(flow_slug, shop_fields(record))
            .await
            .map_err(AppError::from);
        if let Ok(entry) = &result {
            log::info!("Created shop {:?} ({})", record.alias, entry.id);
        }
        report.record(&format!("shop {:?}", record.alias), result);
    }
    report
}

/// Entry fields for a shop, keyed by the slugs in [`SHOP_FIELDS`].
pub fn shop_fields(record: &ShopRecord) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("Address".to_string(), Value::from(record.address.full.clone()));
    fields.insert("Alias".to_string(), Value::from(record.alias.clone()));
    fields.insert("Longitude".to_string(), Value::from(record.coordinates.lon));
    fields.insert("Latitude".to_string(), Value::from(record.coordinates.lat));
    fields
}

/// Creates the shops flow and its fields.
pub async fn setup_shops_flow(client: &ElasticpathClient, name: &str, slug: &str) -> AppResult<Flow> {
    let flow = client
        .create_flow(&NewFlow {
            name: name.to_string(),
            slug: slug.to_string(),
            description: format!("{} locations", name),
            enabled: true,
        })
        .await?;
    log::info!("Created flow {:?} ({})", flow.slug, flow.id);

    for (field_slug, field_type, description) in SHOP_FIELDS {
        let field = client
            .create_field(
                &flow,
                &NewField {
                    name: field_slug.to_string(),
                    slug: field_slug.to_string(),
                    description: description.to_string(),
                    field_type,
                    required: true,
                    enabled: true,
                },
            )
            .await?;
        log::info!("Created field {:?} ({})", field.slug, field.id);
    }

    Ok(flow)
}
