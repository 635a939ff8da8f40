//! Documents
//!
//! The schemaless value tree orders are persisted as, the sanitizer that
//! prepares it for a store, and the serde bridge between it and the domain
//! types.

pub mod de;
pub mod sanitize;
pub mod ser;
pub mod value;

pub use de::{DecodeError, from_document, from_value};
pub use sanitize::{sanitize, sanitize_document};
pub use ser::{EncodeError, timestamp, to_document, to_value};
pub use value::{Document, Value, get_path, set_path};
