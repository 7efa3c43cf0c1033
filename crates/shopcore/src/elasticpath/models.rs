//! Elasticpath entities (products, carts, files, ...).
//!
//! The API speaks JSON:API: every payload is wrapped in `{"data": ...}` and
//! prices hide under `meta.display_price`. The `Raw*` structs mirror the wire
//! format; the public structs are what the rest of the bot works with.

use serde::{Deserialize, Serialize};

/// `{"data": ...}` wrapper used by every request and response body.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawProduct")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price with tax, already formatted by the store (e.g. "1 000 ₽")
    pub formatted_price: String,
    pub stock_level: i64,
    pub stock_availability: String,
    pub main_image_id: Option<String>,
}

/// A cart, referenced by an arbitrary string (the bot uses the chat id).
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: String,
    pub reference: String,
    /// Cart total with tax, formatted
    pub formatted_price: String,
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawCartItem")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    /// Unit price with tax, formatted
    pub formatted_price: String,
}

/// An uploaded file (product images).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawFile")]
pub struct File {
    pub id: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

/// A custom data flow (e.g. the list of pickup shops).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Flow {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A field of a flow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// An entry created in a flow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    pub id: String,
}

/// Payload for `POST /v2/products`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "product")]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub manage_stock: bool,
    pub price: Vec<Price>,
    pub status: String,
    pub commodity_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Price {
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub includes_tax: bool,
}

/// Payload for `POST /v2/flows`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "flow")]
pub struct NewFlow {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub enabled: bool,
}

/// Value types a flow field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Float,
    Relationship,
    Date,
}

/// Payload for `POST /v2/fields`. The flow relationship is added by the client.
#[derive(Debug, Clone)]
pub struct NewField {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub field_type: FieldType,
    pub required: bool,
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct FormattedPrice {
    #[serde(default)]
    formatted: String,
}

#[derive(Debug, Default, Deserialize)]
struct DisplayPrice {
    #[serde(default)]
    with_tax: FormattedPrice,
}

#[derive(Debug, Default, Deserialize)]
struct Stock {
    #[serde(default)]
    level: i64,
    #[serde(default)]
    availability: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProductMeta {
    #[serde(default)]
    display_price: DisplayPrice,
    #[serde(default)]
    stock: Stock,
}

#[derive(Debug, Deserialize)]
struct RelationshipRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: Option<RelationshipRef>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductRelationships {
    main_image: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    meta: ProductMeta,
    #[serde(default)]
    relationships: ProductRelationships,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            formatted_price: raw.meta.display_price.with_tax.formatted,
            stock_level: raw.meta.stock.level,
            stock_availability: raw.meta.stock.availability,
            main_image_id: raw.relationships.main_image.and_then(|r| r.data).map(|d| d.id),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CartMeta {
    #[serde(default)]
    display_price: DisplayPrice,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCart {
    id: String,
    #[serde(default)]
    meta: CartMeta,
}

impl RawCart {
    pub(crate) fn into_cart(self, reference: &str) -> Cart {
        Cart {
            id: self.id,
            reference: reference.to_string(),
            formatted_price: self.meta.display_price.with_tax.formatted,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UnitPrice {
    #[serde(default)]
    unit: FormattedPrice,
}

#[derive(Debug, Default, Deserialize)]
struct CartItemDisplayPrice {
    #[serde(default)]
    with_tax: UnitPrice,
}

#[derive(Debug, Default, Deserialize)]
struct CartItemMeta {
    #[serde(default)]
    display_price: CartItemDisplayPrice,
}

#[derive(Debug, Deserialize)]
struct RawCartItem {
    id: String,
    #[serde(default)]
    product_id: String,
    name: String,
    #[serde(default)]
    description: String,
    quantity: u32,
    #[serde(default)]
    meta: CartItemMeta,
}

impl From<RawCartItem> for CartItem {
    fn from(raw: RawCartItem) -> Self {
        Self {
            id: raw.id,
            product_id: raw.product_id,
            name: raw.name,
            description: raw.description,
            quantity: raw.quantity,
            formatted_price: raw.meta.display_price.with_tax.unit.formatted,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    id: String,
    link: Link,
}

impl From<RawFile> for File {
    fn from(raw: RawFile) -> Self {
        Self {
            id: raw.id,
            link: raw.link.href,
        }
    }
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Unix timestamp (seconds) after which the token is invalid
    pub expires: i64,
}
