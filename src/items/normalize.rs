//! Line item normalization
//!
//! Coerces every raw [`LineItem`] into a [`NormalizedLineItem`]. This never
//! fails: malformed values fall back to documented defaults.

use std::str::FromStr;

use jiff::Timestamp;
use rand::{Rng, distributions::Alphanumeric};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use tracing::warn;

use super::{
    DEFAULT_BRAND, DEFAULT_CATEGORY, DEFAULT_COLORS, DEFAULT_IMAGE, DEFAULT_SIZE, LineItem,
    NormalizedLineItem, NumericInput, UNKNOWN_PRODUCT_NAME,
};

const GENERATED_ID_SUFFIX_LEN: usize = 8;

/// Normalizes a single raw line item.
pub fn normalize(item: &LineItem) -> NormalizedLineItem {
    let product_id = non_empty(item.id.as_deref()).map_or_else(generate_item_id, str::to_string);

    let name = non_empty(item.name.as_deref())
        .or_else(|| non_empty(item.title.as_deref()))
        .unwrap_or(UNKNOWN_PRODUCT_NAME)
        .to_string();

    let unit_price = item.unit_price.as_ref().map_or(Decimal::ZERO, parse_price);
    let quantity = item.quantity.as_ref().map_or(1, parse_quantity);

    if unit_price.is_zero() {
        warn!(product_id = %product_id, "line item normalized to a zero unit price");
    }

    let sku = non_empty(item.sku.as_deref())
        .map_or_else(|| format!("SKU-{product_id}"), str::to_string);

    NormalizedLineItem {
        name,
        image: or_default(item.image.as_deref(), DEFAULT_IMAGE),
        unit_price,
        quantity,
        colors: or_default(item.colors.as_deref(), DEFAULT_COLORS),
        badge: non_empty(item.badge.as_deref()).map(str::to_string),
        item_total: unit_price.saturating_mul(Decimal::from(quantity)),
        category: or_default(item.category.as_deref(), DEFAULT_CATEGORY),
        brand: or_default(item.brand.as_deref(), DEFAULT_BRAND),
        size: or_default(item.size.as_deref(), DEFAULT_SIZE),
        sku,
        product_id,
    }
}

/// Normalizes every item in a cart, preserving order.
pub fn normalize_all(items: &[LineItem]) -> Vec<NormalizedLineItem> {
    items.iter().map(normalize).collect()
}

/// Generates an item id from the current time and a random suffix.
pub fn generate_item_id() -> String {
    generate_prefixed_id("item", Timestamp::now(), &mut rand::thread_rng())
}

pub(crate) fn generate_prefixed_id(prefix: &str, now: Timestamp, rng: &mut impl Rng) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("{prefix}-{}-{suffix}", now.as_millisecond())
}

fn parse_price(input: &NumericInput) -> Decimal {
    let parsed = match input {
        NumericInput::Number(value) => Decimal::from_f64(*value),
        NumericInput::Text(text) => parse_decimal(text),
    };

    match parsed {
        Some(price) if price.is_sign_negative() && !price.is_zero() => {
            warn!(%price, "negative unit price clamped to zero");

            Decimal::ZERO
        }
        Some(price) => price.normalize(),
        None => Decimal::ZERO,
    }
}

pub(crate) fn parse_quantity(input: &NumericInput) -> u32 {
    let parsed = match input {
        NumericInput::Number(value) => Decimal::from_f64(*value),
        NumericInput::Text(text) => parse_decimal(text),
    };

    match parsed {
        Some(quantity) if quantity > Decimal::ZERO => {
            quantity.floor().to_u32().unwrap_or(u32::MAX).max(1)
        }
        _ => 1,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();

    Decimal::from_str(text).ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .and_then(Decimal::from_f64)
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn or_default(value: Option<&str>, default: &str) -> String {
    non_empty(value).unwrap_or(default).to_string()
}
