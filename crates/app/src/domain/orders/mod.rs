//! Orders

pub mod errors;
mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use repository::{SavedOrder, StoredOrder};
pub use service::*;
