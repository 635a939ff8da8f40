//! Orebi application services: persistence, checkout and wiring.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod session;
pub mod store;

#[cfg(test)]
mod test;
