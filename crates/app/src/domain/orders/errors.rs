//! Orders service errors.

use orebi::{document::DecodeError, tracking::TransitionError};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("storage error")]
    Store(#[source] StoreError),

    #[error("stored order is malformed")]
    Decode(#[source] DecodeError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => Self::NotFound,
            StoreError::Codec(error) => Self::Decode(error),
            error @ (StoreError::Unavailable(_)
            | StoreError::UnsupportedValue { .. }
            | StoreError::Encode(_)) => Self::Store(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_classified() {
        let not_found = OrdersServiceError::from(StoreError::NotFound {
            collection: "orders".to_string(),
            id: "x".to_string(),
        });
        let codec = OrdersServiceError::from(StoreError::Codec(DecodeError::MissingField(
            "userId".to_string(),
        )));
        let offline = OrdersServiceError::from(StoreError::Unavailable("offline".to_string()));

        assert!(matches!(not_found, OrdersServiceError::NotFound), "got {not_found:?}");
        assert!(matches!(codec, OrdersServiceError::Decode(_)), "got {codec:?}");
        assert!(matches!(offline, OrdersServiceError::Store(_)), "got {offline:?}");
    }
}
