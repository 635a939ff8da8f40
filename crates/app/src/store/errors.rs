//! Document store errors.

use orebi::document::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("unsupported value at `{field}`")]
    UnsupportedValue { field: String },

    #[error("value cannot be stored as a document")]
    Encode(#[from] EncodeError),

    #[error("stored document is malformed")]
    Codec(#[from] DecodeError),
}
