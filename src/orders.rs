//! Orders
//!
//! The order aggregate: the immutable record written at checkout plus the
//! status fields the tracking state machine moves forward afterwards.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    customer::CustomerInfo,
    document::{Document, EncodeError, timestamp, to_document},
    items::NormalizedLineItem,
    pricing::PriceBreakdown,
    tracking::{
        OrderStatus, Stage, StageRecord, StatusUpdate, TrackingStages, TransitionError,
        plan_transition,
    },
};

pub mod assembler;
pub mod filter;
pub mod history;
pub mod ids;
pub mod stats;

pub use assembler::{OrderSettings, assemble};
pub use filter::OrderFilter;
pub use history::{HistoryAction, OrderHistoryEntry};
pub use ids::OrderId;
pub use stats::OrderStats;

/// Payment state. Checkout never collects payment, so every order is
/// written, and stays, pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not yet paid.
    #[default]
    Pending,
}

impl PaymentStatus {
    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how an order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetadata {
    /// Originating channel, e.g. `web`.
    pub source: String,

    /// Creation time in epoch milliseconds.
    pub timestamp: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// BCP 47 locale used for display.
    pub locale: String,
}

/// Free-text notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    /// Left by the customer.
    pub customer: String,

    /// Staff-only.
    pub internal: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Human-facing identifier.
    pub order_id: OrderId,

    /// Owning user.
    pub user_id: String,

    /// Owning user's sign-in email.
    pub user_email: String,

    /// Customer snapshot taken at checkout.
    pub customer_info: CustomerInfo,

    /// Normalized items, in cart order.
    pub items: Vec<NormalizedLineItem>,

    /// Number of distinct line items.
    pub item_count: u32,

    /// Units across all line items.
    pub total_quantity: u64,

    /// Derived price breakdown.
    pub pricing: PriceBreakdown,

    /// Overall status.
    pub status: OrderStatus,

    /// Payment state.
    pub payment_status: PaymentStatus,

    /// Per-stage tracking records.
    pub tracking_stages: TrackingStages,

    /// When the order was placed.
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: Timestamp,

    /// Last status change.
    #[serde(serialize_with = "timestamp::serialize")]
    pub updated_at: Timestamp,

    /// Expected delivery date.
    #[serde(serialize_with = "timestamp::serialize")]
    pub estimated_delivery: Timestamp,

    /// Placement metadata.
    pub metadata: OrderMetadata,

    /// Notes.
    pub notes: OrderNotes,
}

/// The stored form of an [`Order`]: every field, plus the `orderNumber` and
/// `orderStage` copies that list views read without decoding the stages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedOrder<'a> {
    #[serde(flatten)]
    order: &'a Order,

    order_number: &'a OrderId,
    order_stage: Stage,
}

/// The effect of a successfully applied [`StatusUpdate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the update.
    pub from: OrderStatus,

    /// Status after the update.
    pub to: OrderStatus,

    /// Stages completed by the update, in pipeline order.
    pub completed: Vec<Stage>,

    /// When the update was applied.
    pub at: Timestamp,
}

impl StatusChange {
    /// Whether the update cancelled the order.
    pub fn is_cancellation(&self) -> bool {
        self.to == OrderStatus::Cancelled
    }
}

impl Order {
    /// The document written for this order. May contain missing markers.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if a field has no document form.
    pub fn to_document(&self) -> Result<Document, EncodeError> {
        to_document(&PersistedOrder {
            order: self,
            order_number: &self.order_id,
            order_stage: self.order_stage(),
        })
    }

    /// The furthest completed fulfilment stage.
    pub fn order_stage(&self) -> Stage {
        self.tracking_stages.current_stage()
    }

    /// Applies a status update in place.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] when the update is not a legal transition;
    /// the order is left untouched.
    pub fn apply(
        &mut self,
        update: StatusUpdate,
        now: Timestamp,
    ) -> Result<StatusChange, TransitionError> {
        let from = self.status;
        let completed = plan_transition(from, update)?;

        for stage in &completed {
            self.tracking_stages.complete(*stage, now);
        }

        if update == StatusUpdate::Cancel {
            self.tracking_stages.cancelled = Some(StageRecord::completed(now, "Order cancelled"));
        }

        self.status = update.target_status();
        self.updated_at = now;

        Ok(StatusChange {
            from,
            to: self.status,
            completed,
            at: now,
        })
    }
}
