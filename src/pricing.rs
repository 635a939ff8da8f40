//! Pricing
//!
//! Pure functions deriving an order's price breakdown from its line items.
//! Every amount is a [`Decimal`] and every rounding step is half-up to whole
//! currency units, applied exactly once.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::items::{LineItem, NormalizedLineItem, normalize_all};

/// Flat tax rate, in percent, applied to the discounted subtotal.
pub const TAX_RATE_PERCENT: u32 = 18;

/// Subtotals at or below this ship at [`SHIPPING_SMALL`].
pub const SHIPPING_SMALL_MAX: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Subtotals at or below this (and above [`SHIPPING_SMALL_MAX`]) ship at [`SHIPPING_MEDIUM`].
pub const SHIPPING_MEDIUM_MAX: Decimal = Decimal::from_parts(400, 0, 0, false, 0);

/// Shipping charge for small orders.
pub const SHIPPING_SMALL: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Shipping charge for medium orders.
pub const SHIPPING_MEDIUM: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Shipping charge for large orders.
pub const SHIPPING_LARGE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Subtotals at or above this earn the lower discount tier.
pub const DISCOUNT_LOWER_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Subtotals at or above this earn the upper discount tier.
pub const DISCOUNT_UPPER_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Sum of `unit_price * quantity` over all items.
///
/// Uses saturating arithmetic so absurd inputs cannot panic; carts are bounded
/// well below saturation before an order is assembled.
pub fn subtotal(items: &[NormalizedLineItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| {
        acc.saturating_add(item.unit_price.saturating_mul(Decimal::from(item.quantity)))
    })
}

/// Tiered discount: 10% from 1000, 5% from 500, nothing below.
pub fn discount(subtotal: Decimal) -> Decimal {
    discount_rate(subtotal).map_or(Decimal::ZERO, |rate| apply_rate(subtotal, rate))
}

/// The subtotal after the discount has been taken off.
pub fn discounted_subtotal(subtotal: Decimal) -> Decimal {
    subtotal - discount(subtotal)
}

/// Tax on the discounted subtotal. Shipping is never taxed.
pub fn tax(discounted_subtotal: Decimal) -> Decimal {
    apply_rate(discounted_subtotal, tax_rate())
}

/// Tiered flat shipping fee, keyed on the pre-discount subtotal.
///
/// Larger orders pay *less* shipping: 30 up to 200, 25 up to 400, 20 above.
pub fn shipping_charge(subtotal: Decimal) -> Decimal {
    if subtotal <= SHIPPING_SMALL_MAX {
        SHIPPING_SMALL
    } else if subtotal <= SHIPPING_MEDIUM_MAX {
        SHIPPING_MEDIUM
    } else {
        SHIPPING_LARGE
    }
}

/// Discount as a whole percentage of the subtotal, for display only.
pub fn discount_percentage(discount: Decimal, subtotal: Decimal) -> u32 {
    if subtotal <= Decimal::ZERO {
        return 0;
    }

    discount
        .checked_div(subtotal)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_half_up)
        .and_then(|percent| percent.to_u32())
        .unwrap_or(0)
}

/// Rounds to whole currency units, halves rounding up.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn discount_rate(subtotal: Decimal) -> Option<Percentage> {
    if subtotal >= DISCOUNT_UPPER_THRESHOLD {
        Some(Percentage::from(Decimal::new(10, 2)))
    } else if subtotal >= DISCOUNT_LOWER_THRESHOLD {
        Some(Percentage::from(Decimal::new(5, 2)))
    } else {
        None
    }
}

fn tax_rate() -> Percentage {
    Percentage::from(Decimal::new(i64::from(TAX_RATE_PERCENT), 2))
}

fn apply_rate(amount: Decimal, rate: Percentage) -> Decimal {
    round_half_up(amount.saturating_mul(rate * Decimal::ONE))
}

/// Full price breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Sum of item totals.
    pub subtotal: Decimal,

    /// Tiered discount amount.
    pub discount: Decimal,

    /// Discount as a rounded percentage of the subtotal.
    pub discount_percentage: u32,

    /// `subtotal - discount`.
    pub discounted_subtotal: Decimal,

    /// Tax on the discounted subtotal.
    pub tax: Decimal,

    /// Tax rate in percent.
    pub tax_rate: u32,

    /// Tiered shipping fee.
    pub shipping_charge: Decimal,

    /// `discounted_subtotal + tax + shipping_charge`.
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Derives the breakdown from normalized items.
    pub fn calculate(items: &[NormalizedLineItem]) -> Self {
        Self::from_subtotal(subtotal(items))
    }

    /// Normalizes raw cart items, then derives the breakdown.
    pub fn quote(items: &[LineItem]) -> Self {
        Self::calculate(&normalize_all(items))
    }

    /// Derives the breakdown from an already-summed subtotal.
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let discount = discount(subtotal);
        let discounted_subtotal = subtotal - discount;
        let tax = tax(discounted_subtotal);
        let shipping_charge = shipping_charge(subtotal);

        Self {
            subtotal,
            discount,
            discount_percentage: discount_percentage(discount, subtotal),
            discounted_subtotal,
            tax,
            tax_rate: TAX_RATE_PERCENT,
            shipping_charge,
            total: discounted_subtotal
                .saturating_add(tax)
                .saturating_add(shipping_charge),
        }
    }
}
