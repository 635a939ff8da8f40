//! Document Store
//!
//! A narrow view of a hosted document database: collections of schemaless
//! documents addressed by id, with simple equality queries.

use async_trait::async_trait;
use mockall::automock;
use orebi::document::{Document, Value};

pub mod errors;
pub mod memory;

pub use errors::StoreError;
pub use memory::MemoryDocumentStore;

/// Collection holding placed orders.
pub const ORDERS_COLLECTION: &str = "orders";

/// Collection holding user profiles, keyed by user id.
pub const USERS_COLLECTION: &str = "users";

/// Child collection holding an order's history entries.
pub fn history_collection(order_document_id: &str) -> String {
    format!("{ORDERS_COLLECTION}/{order_document_id}/history")
}

/// A stored document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Equality filters, an optional sort and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps documents whose field at `path` equals `value`.
    #[must_use]
    pub fn filter(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((path.into(), value.into()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, path: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((path.into(), direction));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document with a store-generated id and returns the id.
    async fn create_document(&self, collection: &str, data: Document)
    -> Result<String, StoreError>;

    /// Creates or replaces the document with the given id.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), StoreError>;

    /// Reads one document; `None` if it does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Runs a query against one collection.
    async fn query_documents(
        &self,
        collection: &str,
        query: Query,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Writes individual fields, addressed by dotted path, of an existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Vec<(String, Value)>,
    ) -> Result<(), StoreError>;
}
