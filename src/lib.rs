//! Orebi
//!
//! Order pricing and checkout assembly for the Orebi storefront: line item
//! normalization, tiered pricing, order assembly, tracking-stage transitions
//! and the document encoding orders are persisted with.

pub mod cart;
pub mod customer;
pub mod document;
pub mod items;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod tracking;
