//! Cart
//!
//! The shopper's cart and the validation boundary every checkout passes
//! through before an order can be assembled.

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    items::{
        LineItem, NormalizedLineItem, NumericInput,
        normalize::{generate_prefixed_id, parse_quantity},
        normalize_all,
    },
    pricing::PriceBreakdown,
};

/// Largest unit price accepted at checkout.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest per-item quantity accepted at checkout.
pub const MAX_QUANTITY: u32 = 1_000_000;

/// Errors raised when a cart cannot be checked out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartValidationError {
    /// The cart has no items.
    #[error("cart is empty")]
    Empty,

    /// An item's price or quantity is beyond what can be priced exactly (item index).
    #[error("item {index} has an out-of-range price or quantity")]
    AmountOutOfRange {
        /// Position of the offending item in the cart.
        index: usize,
    },
}

/// A non-empty, normalized set of items that is safe to price and persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCart {
    items: Vec<NormalizedLineItem>,
}

impl ValidatedCart {
    /// Normalizes and validates raw cart items.
    ///
    /// # Errors
    ///
    /// - [`CartValidationError::Empty`]: no items were provided.
    /// - [`CartValidationError::AmountOutOfRange`]: an item exceeds [`MAX_UNIT_PRICE`] or [`MAX_QUANTITY`].
    pub fn new(items: &[LineItem]) -> Result<Self, CartValidationError> {
        Self::from_normalized(normalize_all(items))
    }

    /// Validates items that were normalized elsewhere.
    ///
    /// # Errors
    ///
    /// See [`ValidatedCart::new`].
    pub fn from_normalized(items: Vec<NormalizedLineItem>) -> Result<Self, CartValidationError> {
        if items.is_empty() {
            return Err(CartValidationError::Empty);
        }

        items.iter().enumerate().try_for_each(|(index, item)| {
            let in_range = !item.unit_price.is_sign_negative()
                && item.unit_price <= MAX_UNIT_PRICE
                && (1..=MAX_QUANTITY).contains(&item.quantity);

            if in_range {
                Ok(())
            } else {
                Err(CartValidationError::AmountOutOfRange { index })
            }
        })?;

        Ok(Self { items })
    }

    /// The validated items.
    pub fn items(&self) -> &[NormalizedLineItem] {
        &self.items
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Price breakdown of the validated items.
    pub fn price_breakdown(&self) -> PriceBreakdown {
        PriceBreakdown::calculate(&self.items)
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<NormalizedLineItem> {
        self.items
    }
}

/// In-memory shopping cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cart holding the given items as-is.
    pub fn with_items(items: impl Into<Vec<LineItem>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Adds an item, merging quantities with an existing entry of the same id.
    ///
    /// Items without an id are given a generated one.
    pub fn add(&mut self, item: LineItem) {
        let mut item = item;

        let id = match item.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_prefixed_id("cart", Timestamp::now(), &mut rand::thread_rng()),
        };

        item.id = Some(id.clone());

        let added = quantity_of(&item);

        if let Some(existing) = self.find_mut(&id) {
            let merged = quantity_of(existing).saturating_add(added);
            existing.quantity = Some(NumericInput::from(merged));
        } else {
            self.items.push(item);
        }
    }

    /// Increases an item's quantity by one.
    pub fn increase(&mut self, id: &str) {
        if let Some(item) = self.find_mut(id) {
            let quantity = quantity_of(item).saturating_add(1);
            item.quantity = Some(NumericInput::from(quantity));
        }
    }

    /// Decreases an item's quantity by one, never below one.
    pub fn decrease(&mut self, id: &str) {
        if let Some(item) = self.find_mut(id) {
            let quantity = quantity_of(item).saturating_sub(1).max(1);
            item.quantity = Some(NumericInput::from(quantity));
        }
    }

    /// Removes an item entirely.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id.as_deref() != Some(id));
    }

    /// Empties the cart.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// The items currently in the cart.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(quantity_of(item))).sum()
    }

    /// Live price breakdown, as shown next to the cart.
    pub fn price_breakdown(&self) -> PriceBreakdown {
        PriceBreakdown::quote(&self.items)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.id.as_deref() == Some(id))
    }
}

fn quantity_of(item: &LineItem) -> u32 {
    item.quantity.as_ref().map_or(1, parse_quantity)
}
