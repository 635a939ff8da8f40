//! Items
//!
//! Raw cart line items as they arrive from the cart store, and the canonical
//! [`NormalizedLineItem`] shape every later stage works with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod normalize;

pub use normalize::{normalize, normalize_all};

/// Placeholder name for items that arrive without any usable name.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Placeholder image reference.
pub const DEFAULT_IMAGE: &str = "";

/// Placeholder colour/variant.
pub const DEFAULT_COLORS: &str = "";

/// Default category.
pub const DEFAULT_CATEGORY: &str = "General";

/// Default brand.
pub const DEFAULT_BRAND: &str = "Sttrika";

/// Default size.
pub const DEFAULT_SIZE: &str = "One Size";

/// A numeric field that may arrive either as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// Already numeric.
    Number(f64),

    /// Textual, parsed during normalization.
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for NumericInput {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A cart line item, exactly as the cart store holds it.
///
/// Every field is optional: cart entries are assembled from product listings
/// of varying completeness. [`normalize`] is the single place that turns this
/// into a [`NormalizedLineItem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier.
    #[serde(default, alias = "_id")]
    pub id: Option<String>,

    /// Primary display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Secondary display name, used when `name` is empty.
    #[serde(default)]
    pub title: Option<String>,

    /// Price of a single unit.
    #[serde(default, alias = "price")]
    pub unit_price: Option<NumericInput>,

    /// Number of units.
    #[serde(default)]
    pub quantity: Option<NumericInput>,

    /// Colour or variant.
    #[serde(default, alias = "color")]
    pub colors: Option<String>,

    /// Marketing badge ("new", "sale", ...).
    #[serde(default)]
    pub badge: Option<String>,

    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,

    /// Product category.
    #[serde(default)]
    pub category: Option<String>,

    /// Product brand.
    #[serde(default)]
    pub brand: Option<String>,

    /// Product size.
    #[serde(default)]
    pub size: Option<String>,

    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<String>,
}

impl LineItem {
    /// Creates a line item with an id, name, unit price and quantity.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: impl Into<NumericInput>,
        quantity: u32,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            unit_price: Some(unit_price.into()),
            quantity: Some(quantity.into()),
            ..Self::default()
        }
    }
}

/// A line item coerced into its canonical, fully-populated shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLineItem {
    /// Product identifier (generated when the raw item had none).
    pub product_id: String,

    /// Display name.
    pub name: String,

    /// Image reference.
    pub image: String,

    /// Unit price, finite and non-negative.
    #[serde(rename = "price")]
    pub unit_price: Decimal,

    /// Units ordered, at least 1.
    pub quantity: u32,

    /// Colour or variant.
    pub colors: String,

    /// Optional marketing badge.
    #[serde(default)]
    pub badge: Option<String>,

    /// `unit_price * quantity`.
    pub item_total: Decimal,

    /// Product category.
    pub category: String,

    /// Product brand.
    pub brand: String,

    /// Product size.
    pub size: String,

    /// Stock keeping unit.
    pub sku: String,
}

/// Total number of units across a list of normalized items.
pub fn total_quantity(items: &[NormalizedLineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}
