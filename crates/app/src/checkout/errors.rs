//! Checkout errors.

use orebi::cart::CartValidationError;
use thiserror::Error;

use crate::domain::orders::OrdersServiceError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("please sign in to place an order")]
    AuthenticationMissing,

    #[error(transparent)]
    Validation(#[from] CartValidationError),

    #[error("failed to place order, please try again")]
    Persistence(#[source] OrdersServiceError),

    #[error("an order is already being placed")]
    AlreadyInProgress,
}
