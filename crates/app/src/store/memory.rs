//! In-memory document store.

use std::{cmp::Ordering, collections::BTreeMap};

use async_trait::async_trait;
use orebi::document::{Document, Value, get_path, set_path};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Direction, DocumentStore, Query, StoreError, StoredDocument};

type Collection = BTreeMap<String, Document>;

/// Process-local [`DocumentStore`]. Document ids are UUIDv7, so iteration
/// order follows creation order.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<FxHashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        data: Document,
    ) -> Result<String, StoreError> {
        reject_missing(&data)?;

        let id = Uuid::now_v7().to_string();

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);

        debug!(collection, id = %id, "created document");

        Ok(id)
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), StoreError> {
        reject_missing(&data)?;

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);

        Ok(())
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn query_documents(
        &self,
        collection: &str,
        query: Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;

        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<StoredDocument> = documents
            .iter()
            .filter(|(_, data)| {
                query
                    .filters
                    .iter()
                    .all(|(path, expected)| get_path(data, path) == Some(expected))
            })
            .map(|(id, data)| StoredDocument {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        if let Some((path, direction)) = &query.order_by {
            matched.sort_by(|a, b| {
                let ordering = compare(get_path(&a.data, path), get_path(&b.data, path));

                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.contains_missing()) {
            return Err(StoreError::UnsupportedValue {
                field: field.clone(),
            });
        }

        let mut collections = self.collections.write().await;

        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (path, value) in fields {
            set_path(document, &path, value);
        }

        Ok(())
    }
}

fn reject_missing(data: &Document) -> Result<(), StoreError> {
    match first_missing(data, "") {
        Some(field) => Err(StoreError::UnsupportedValue { field }),
        None => Ok(()),
    }
}

fn first_missing(document: &Document, prefix: &str) -> Option<String> {
    document.iter().find_map(|(key, value)| {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        missing_in(value, &path)
    })
}

fn missing_in(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Missing => Some(path.to_string()),
        Value::Map(document) => first_missing(document, path),
        Value::Array(values) => values
            .iter()
            .enumerate()
            .find_map(|(index, value)| missing_in(value, &format!("{path}.{index}"))),
        _ => None,
    }
}

/// Orders values of the same kind; absent values sort first.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Timestamp(a)), Some(Value::Timestamp(b))) => a.cmp(b),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(a), Some(b)) => match (a.as_decimal(), b.as_decimal()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        },
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use super::*;

    fn document(fields: &[(&str, Value)]) -> Document {
        fields
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    fn at(second: i64) -> TestResult<Value> {
        Ok(Value::Timestamp(Timestamp::from_second(second)?))
    }

    #[tokio::test]
    async fn create_then_get() -> TestResult {
        let store = MemoryDocumentStore::new();
        let data = document(&[("name", Value::from("Asha"))]);

        let id = store.create_document("users", data.clone()).await?;

        assert_eq!(store.get_document("users", &id).await?, Some(data));
        assert_eq!(store.get_document("users", "nope").await?, None);
        assert_eq!(store.get_document("orders", &id).await?, None);
        assert_eq!(store.len("users").await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn set_document_upserts() -> TestResult {
        let store = MemoryDocumentStore::new();

        store
            .set_document("users", "u1", document(&[("city", Value::from("Pune"))]))
            .await?;
        store
            .set_document("users", "u1", document(&[("city", Value::from("Goa"))]))
            .await?;

        let stored = store.get_document("users", "u1").await?;

        assert_eq!(
            stored.and_then(|d| d.get("city").cloned()),
            Some(Value::from("Goa"))
        );
        assert_eq!(store.len("users").await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn missing_markers_are_rejected() {
        let store = MemoryDocumentStore::new();
        let mut data = document(&[("name", Value::from("Tote"))]);
        set_path(&mut data, "items", Value::Array(vec![Value::Map(document(&[("badge", Value::Missing)]))]));

        let result = store.create_document("orders", data).await;

        assert!(
            matches!(&result, Err(StoreError::UnsupportedValue { field }) if field == "items.0.badge"),
            "expected UnsupportedValue, got {result:?}"
        );
        assert_eq!(store.len("orders").await, 0);
    }

    #[tokio::test]
    async fn null_is_accepted() -> TestResult {
        let store = MemoryDocumentStore::new();

        store
            .create_document("orders", document(&[("timestamp", Value::Null)]))
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() -> TestResult {
        let store = MemoryDocumentStore::new();

        for (user, second) in [("a", 30), ("b", 20), ("a", 10), ("a", 40)] {
            store
                .create_document(
                    "orders",
                    document(&[("userId", Value::from(user)), ("createdAt", at(second)?)]),
                )
                .await?;
        }

        let newest_first = store
            .query_documents(
                "orders",
                Query::new()
                    .filter("userId", "a")
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;

        let times: Vec<_> = newest_first
            .iter()
            .filter_map(|d| d.data.get("createdAt").and_then(Value::as_timestamp))
            .map(Timestamp::as_second)
            .collect();

        assert_eq!(times, [40, 30, 10]);

        let limited = store
            .query_documents(
                "orders",
                Query::new()
                    .order_by("createdAt", Direction::Ascending)
                    .limit(2),
            )
            .await?;

        let times: Vec<_> = limited
            .iter()
            .filter_map(|d| d.data.get("createdAt").and_then(Value::as_timestamp))
            .map(Timestamp::as_second)
            .collect();

        assert_eq!(times, [10, 20]);
        assert!(store.query_documents("carts", Query::new()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn update_writes_field_paths() -> TestResult {
        let store = MemoryDocumentStore::new();
        let mut data = document(&[("status", Value::from("pending"))]);
        set_path(&mut data, "trackingStages.placed.status", Value::from("completed"));

        let id = store.create_document("orders", data).await?;

        store
            .update_document(
                "orders",
                &id,
                vec![
                    ("status".to_string(), Value::from("shipped")),
                    (
                        "trackingStages.shipped".to_string(),
                        Value::Map(document(&[("status", Value::from("completed"))])),
                    ),
                ],
            )
            .await?;

        let stored = store.get_document("orders", &id).await?.unwrap_or_default();

        assert_eq!(get_path(&stored, "status"), Some(&Value::from("shipped")));
        assert_eq!(
            get_path(&stored, "trackingStages.placed.status"),
            Some(&Value::from("completed"))
        );
        assert_eq!(
            get_path(&stored, "trackingStages.shipped.status"),
            Some(&Value::from("completed"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_of_unknown_document_fails() {
        let store = MemoryDocumentStore::new();

        let result = store
            .update_document("orders", "nope", vec![("status".to_string(), Value::Null)])
            .await;

        assert!(
            matches!(result, Err(StoreError::NotFound { .. })),
            "expected NotFound, got {result:?}"
        );
    }
}
