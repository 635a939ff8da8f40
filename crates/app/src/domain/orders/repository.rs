//! Orders Repository
//!
//! Two-phase writes: the order document first, then a best-effort history
//! entry in the order's child collection.

use std::sync::Arc;

use orebi::{
    document::{Value, from_document, sanitize_document, to_document, to_value},
    orders::{Order, OrderHistoryEntry, StatusChange},
};
use tracing::{info, warn};

use crate::store::{
    Direction, DocumentStore, ORDERS_COLLECTION, Query, StoreError, StoredDocument,
    history_collection,
};

/// Outcome of writing a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOrder {
    /// Store-assigned document id.
    pub document_id: String,

    /// Whether the `order_created` history entry was written.
    pub history_recorded: bool,
}

/// An order read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    pub document_id: String,
    pub order: Order,
}

#[derive(Clone)]
pub(crate) struct OrdersRepository {
    store: Arc<dyn DocumentStore>,
}

impl OrdersRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn save(&self, order: &Order) -> Result<SavedOrder, StoreError> {
        let document_id = self
            .store
            .create_document(ORDERS_COLLECTION, sanitize_document(order.to_document()?))
            .await?;

        info!(order_id = %order.order_id, document_id, "order written");

        let history_recorded = self
            .record_history(
                &document_id,
                &OrderHistoryEntry::created(&order.order_id, order.created_at),
            )
            .await;

        Ok(SavedOrder {
            document_id,
            history_recorded,
        })
    }

    pub(crate) async fn find(&self, document_id: &str) -> Result<Option<StoredOrder>, StoreError> {
        self.store
            .get_document(ORDERS_COLLECTION, document_id)
            .await?
            .map(|data| -> Result<StoredOrder, StoreError> {
                Ok(StoredOrder {
                    document_id: document_id.to_string(),
                    order: from_document(&data)?,
                })
            })
            .transpose()
    }

    pub(crate) async fn list_for_user(&self, user_id: &str) -> Result<Vec<StoredOrder>, StoreError> {
        let documents = self
            .store
            .query_documents(
                ORDERS_COLLECTION,
                Query::new()
                    .filter("userId", user_id)
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;

        Ok(decode_all(documents))
    }

    pub(crate) async fn list_all(&self) -> Result<Vec<StoredOrder>, StoreError> {
        let documents = self
            .store
            .query_documents(
                ORDERS_COLLECTION,
                Query::new().order_by("createdAt", Direction::Descending),
            )
            .await?;

        Ok(decode_all(documents))
    }

    /// Writes the fields a status change touched, then records it in history.
    ///
    /// Returns whether the history entry was written.
    pub(crate) async fn update_status(
        &self,
        document_id: &str,
        order: &Order,
        change: &StatusChange,
    ) -> Result<bool, StoreError> {
        let mut fields = vec![
            ("status".to_string(), Value::from(order.status.as_str())),
            (
                "orderStage".to_string(),
                Value::from(order.order_stage().as_str()),
            ),
            ("updatedAt".to_string(), Value::from(order.updated_at)),
        ];

        for stage in &change.completed {
            fields.push((
                format!("trackingStages.{stage}"),
                to_value(order.tracking_stages.get(*stage))?,
            ));
        }

        if let Some(cancelled) = order
            .tracking_stages
            .cancelled
            .as_ref()
            .filter(|_| change.is_cancellation())
        {
            fields.push(("trackingStages.cancelled".to_string(), to_value(cancelled)?));
        }

        self.store
            .update_document(ORDERS_COLLECTION, document_id, fields)
            .await?;

        Ok(self
            .record_history(
                document_id,
                &OrderHistoryEntry::status_changed(&order.order_id, change),
            )
            .await)
    }

    pub(crate) async fn history(
        &self,
        document_id: &str,
    ) -> Result<Vec<OrderHistoryEntry>, StoreError> {
        self.store
            .query_documents(
                &history_collection(document_id),
                Query::new().order_by("timestamp", Direction::Ascending),
            )
            .await?
            .iter()
            .map(|document| from_document(&document.data).map_err(StoreError::from))
            .collect()
    }

    async fn record_history(&self, document_id: &str, entry: &OrderHistoryEntry) -> bool {
        let result = match to_document(entry) {
            Ok(document) => {
                self.store
                    .create_document(&history_collection(document_id), sanitize_document(document))
                    .await
            }
            Err(error) => Err(StoreError::from(error)),
        };

        match result {
            Ok(_) => true,
            Err(error) => {
                warn!(
                    order_id = %entry.order_id,
                    document_id,
                    action = %entry.action,
                    error = %error,
                    "failed to write order history entry"
                );

                false
            }
        }
    }
}

impl std::fmt::Debug for OrdersRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersRepository").finish_non_exhaustive()
    }
}

fn decode_all(documents: Vec<StoredDocument>) -> Vec<StoredOrder> {
    documents
        .into_iter()
        .filter_map(|document| match from_document::<Order>(&document.data) {
            Ok(order) => Some(StoredOrder {
                document_id: document.id,
                order,
            }),
            Err(error) => {
                warn!(document_id = %document.id, error = %error, "skipping malformed order");

                None
            }
        })
        .collect()
}
