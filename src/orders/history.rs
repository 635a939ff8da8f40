//! Order history
//!
//! Append-only lifecycle records kept alongside each order.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{OrderId, StatusChange};
use crate::document::timestamp;

/// Lifecycle event recorded in an order's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The order was written.
    OrderCreated,

    /// The order moved forward.
    StatusUpdated,

    /// The order was cancelled.
    OrderCancelled,
}

impl HistoryAction {
    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::OrderCreated => "order_created",
            HistoryAction::StatusUpdated => "status_updated",
            HistoryAction::OrderCancelled => "order_cancelled",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One history record. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
    /// What happened.
    pub action: HistoryAction,

    /// When it happened.
    #[serde(serialize_with = "timestamp::serialize")]
    pub timestamp: Timestamp,

    /// Human-readable detail.
    pub details: String,

    /// The order it belongs to.
    pub order_id: OrderId,
}

impl OrderHistoryEntry {
    /// Entry for a newly written order.
    pub fn created(order_id: &OrderId, at: Timestamp) -> Self {
        Self {
            action: HistoryAction::OrderCreated,
            timestamp: at,
            details: "Order successfully created and saved to database".to_string(),
            order_id: order_id.clone(),
        }
    }

    /// Entry for an applied status change.
    pub fn status_changed(order_id: &OrderId, change: &StatusChange) -> Self {
        let action = if change.is_cancellation() {
            HistoryAction::OrderCancelled
        } else {
            HistoryAction::StatusUpdated
        };

        Self {
            action,
            timestamp: change.at,
            details: format!("Order status changed from {} to {}", change.from, change.to),
            order_id: order_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        document::{DecodeError, Value, from_document, to_document},
        tracking::{OrderStatus, Stage},
    };

    use super::*;

    #[test]
    fn created_entry() {
        let id = OrderId::from("ORD-1");
        let entry = OrderHistoryEntry::created(&id, Timestamp::UNIX_EPOCH);

        assert_eq!(entry.action.as_str(), "order_created");
        assert_eq!(entry.order_id, id);
        assert_eq!(entry.timestamp, Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn status_change_entries() {
        let id = OrderId::from("ORD-1");
        let shipped = StatusChange {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped,
            completed: vec![Stage::Confirmed, Stage::Shipped],
            at: Timestamp::UNIX_EPOCH,
        };
        let cancelled = StatusChange {
            to: OrderStatus::Cancelled,
            completed: Vec::new(),
            ..shipped.clone()
        };

        let entry = OrderHistoryEntry::status_changed(&id, &shipped);

        assert_eq!(entry.action, HistoryAction::StatusUpdated);
        assert_eq!(entry.details, "Order status changed from pending to shipped");
        assert_eq!(
            OrderHistoryEntry::status_changed(&id, &cancelled).action,
            HistoryAction::OrderCancelled
        );
    }

    #[test]
    fn entry_documents_round_trip() -> TestResult {
        let entry = OrderHistoryEntry::created(&OrderId::from("ORD-1"), Timestamp::UNIX_EPOCH);
        let document = to_document(&entry)?;

        assert_eq!(document.get("action"), Some(&Value::from("order_created")));
        assert_eq!(document.get("orderId"), Some(&Value::from("ORD-1")));
        assert_eq!(
            document.get("timestamp"),
            Some(&Value::Timestamp(Timestamp::UNIX_EPOCH))
        );
        assert_eq!(from_document::<OrderHistoryEntry>(&document)?, entry);

        Ok(())
    }

    #[test]
    fn unknown_actions_are_rejected() -> TestResult {
        let mut document = to_document(&OrderHistoryEntry::created(
            &OrderId::from("ORD-1"),
            Timestamp::UNIX_EPOCH,
        ))?;

        document.insert("action".to_string(), Value::from("deleted"));

        assert_eq!(
            from_document::<OrderHistoryEntry>(&document),
            Err(DecodeError::InvalidValue {
                field: "action".to_string(),
                value: "deleted".to_string(),
            })
        );

        Ok(())
    }
}
