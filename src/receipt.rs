//! Receipt
//!
//! Renders a priced cart or a placed order as a console table followed by
//! the price breakdown.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{items::NormalizedLineItem, orders::Order, pricing::PriceBreakdown};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The currency code is not an ISO 4217 code.
    #[error("unknown currency `{0}`")]
    UnknownCurrency(String),

    /// Writing to the output failed.
    #[error("IO error")]
    IO,
}

/// Looks up an ISO 4217 currency by code.
///
/// # Errors
///
/// Returns [`ReceiptError::UnknownCurrency`] for unrecognised codes.
pub fn currency(code: &str) -> Result<&'static Currency, ReceiptError> {
    iso::find(code).ok_or_else(|| ReceiptError::UnknownCurrency(code.to_string()))
}

/// Formats an amount in the given currency, e.g. `₹693.00`.
pub fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}

/// Items and their price breakdown, ready to print.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    items: &'a [NormalizedLineItem],
    pricing: &'a PriceBreakdown,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Creates a receipt over already-priced items.
    pub fn new(
        items: &'a [NormalizedLineItem],
        pricing: &'a PriceBreakdown,
        currency: &'static Currency,
    ) -> Self {
        Self {
            items,
            pricing,
            currency,
        }
    }

    /// Creates a receipt for a placed order, in the order's currency.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::UnknownCurrency`] if the order carries an unknown currency code.
    pub fn for_order(order: &'a Order) -> Result<Self, ReceiptError> {
        Ok(Self::new(
            &order.items,
            &order.pricing,
            currency(&order.metadata.currency)?,
        ))
    }

    /// Currency all amounts are rendered in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Writes the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Size", "Qty", "Unit Price", "Total"]);

        for item in self.items {
            builder.push_record([
                item.name.clone(),
                item.size.clone(),
                item.quantity.to_string(),
                self.format(item.unit_price),
                self.format(item.item_total),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let pricing = self.pricing;

        let lines = [
            ("Subtotal:".to_string(), self.format(pricing.subtotal)),
            (
                format!("Discount ({}%):", pricing.discount_percentage),
                format!("-{}", self.format(pricing.discount)),
            ),
            (
                format!("Tax ({}%):", pricing.tax_rate),
                self.format(pricing.tax),
            ),
            ("Shipping:".to_string(), self.format(pricing.shipping_charge)),
            ("Total:".to_string(), self.format(pricing.total)),
        ];

        let label_width = lines
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or_default();

        let value_width = lines
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or_default();

        for (label, value) in &lines {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }

    fn format(&self, amount: Decimal) -> String {
        format_amount(amount, self.currency)
    }
}
