//! Order tracking
//!
//! Fulfilment stages form a forward-only pipeline
//! (`placed -> confirmed -> shipped -> delivered`), with `cancelled` as a
//! terminal side exit from any stage short of delivery.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::timestamp;

/// A fulfilment stage. Ordering follows the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The order was written.
    Placed,

    /// The shop accepted the order.
    Confirmed,

    /// The parcel left the warehouse.
    Shipped,

    /// The parcel reached the customer.
    Delivered,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Placed,
        Stage::Confirmed,
        Stage::Shipped,
        Stage::Delivered,
    ];

    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Placed => "placed",
            Stage::Confirmed => "confirmed",
            Stage::Shipped => "shipped",
            Stage::Delivered => "delivered",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,

    /// Confirmed by the shop.
    Confirmed,

    /// Shipped.
    Shipped,

    /// Delivered.
    Delivered,

    /// Cancelled; terminal.
    Cancelled,
}

impl OrderStatus {
    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// The stage this status corresponds to; `None` once cancelled.
    pub fn stage(self) -> Option<Stage> {
        match self {
            OrderStatus::Pending => Some(Stage::Placed),
            OrderStatus::Confirmed => Some(Stage::Confirmed),
            OrderStatus::Shipped => Some(Stage::Shipped),
            OrderStatus::Delivered => Some(Stage::Delivered),
            OrderStatus::Cancelled => None,
        }
    }

    /// Whether no [`StatusUpdate`] can change this status any more: the order
    /// was delivered or cancelled.
    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Delivered)
    }
}

impl From<Stage> for OrderStatus {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Placed => OrderStatus::Pending,
            Stage::Confirmed => OrderStatus::Confirmed,
            Stage::Shipped => OrderStatus::Shipped,
            Stage::Delivered => OrderStatus::Delivered,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status or stage name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for Stage {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Completion state of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not reached yet.
    Pending,

    /// Reached at the recorded timestamp.
    Completed,
}

impl StageStatus {
    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Completed => "completed",
        }
    }
}

/// One entry of the tracking map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Completion state.
    pub status: StageStatus,

    /// When the stage was completed; stored as null until then.
    #[serde(serialize_with = "timestamp::serialize_nullable")]
    pub timestamp: Option<Timestamp>,

    /// Human-readable note.
    pub message: String,
}

impl StageRecord {
    /// A stage that has not been reached.
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Pending,
            timestamp: None,
            message: message.into(),
        }
    }

    /// A stage completed at `at`.
    pub fn completed(at: Timestamp, message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Completed,
            timestamp: Some(at),
            message: message.into(),
        }
    }

    /// Whether the stage has been completed.
    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }
}

/// The fixed set of tracking stages carried by an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStages {
    /// Order placed.
    pub placed: StageRecord,

    /// Order confirmed.
    pub confirmed: StageRecord,

    /// Order shipped.
    pub shipped: StageRecord,

    /// Order delivered.
    pub delivered: StageRecord,

    /// Present only once the order has been cancelled.
    #[serde(default)]
    pub cancelled: Option<StageRecord>,
}

impl TrackingStages {
    /// The skeleton for a freshly placed order.
    pub fn initial(placed_at: Timestamp) -> Self {
        Self {
            placed: StageRecord::completed(placed_at, "Order has been placed successfully"),
            confirmed: StageRecord::pending("Order confirmation pending"),
            shipped: StageRecord::pending("Order will be shipped soon"),
            delivered: StageRecord::pending("Order will be delivered"),
            cancelled: None,
        }
    }

    /// The record for a stage.
    pub fn get(&self, stage: Stage) -> &StageRecord {
        match stage {
            Stage::Placed => &self.placed,
            Stage::Confirmed => &self.confirmed,
            Stage::Shipped => &self.shipped,
            Stage::Delivered => &self.delivered,
        }
    }

    fn get_mut(&mut self, stage: Stage) -> &mut StageRecord {
        match stage {
            Stage::Placed => &mut self.placed,
            Stage::Confirmed => &mut self.confirmed,
            Stage::Shipped => &mut self.shipped,
            Stage::Delivered => &mut self.delivered,
        }
    }

    /// The furthest completed stage.
    pub fn current_stage(&self) -> Stage {
        Stage::ALL
            .into_iter()
            .rev()
            .find(|stage| self.get(*stage).is_completed())
            .unwrap_or(Stage::Placed)
    }

    /// Marks `stage` completed at `at`.
    pub fn complete(&mut self, stage: Stage, at: Timestamp) {
        *self.get_mut(stage) = StageRecord::completed(at, format!("Order {stage}"));
    }
}

/// A requested change to an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Move forward to the given stage.
    Advance(Stage),

    /// Cancel the order.
    Cancel,
}

impl StatusUpdate {
    /// The status the order will have once the update is applied.
    pub fn target_status(self) -> OrderStatus {
        match self {
            StatusUpdate::Advance(stage) => stage.into(),
            StatusUpdate::Cancel => OrderStatus::Cancelled,
        }
    }
}

impl FromStr for StatusUpdate {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.parse::<OrderStatus>()? {
            OrderStatus::Cancelled => Ok(StatusUpdate::Cancel),
            OrderStatus::Pending => Err(UnknownStatus(value.to_string())),
            other => other
                .stage()
                .map(StatusUpdate::Advance)
                .ok_or_else(|| UnknownStatus(value.to_string())),
        }
    }
}

/// Errors raised by illegal status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The order is cancelled; nothing may follow.
    #[error("order is cancelled and cannot change status")]
    Terminal,

    /// Delivered orders cannot be cancelled.
    #[error("delivered orders cannot be cancelled")]
    AlreadyDelivered,

    /// Stages only move forward.
    #[error("cannot move order from {from} to {to}")]
    NotForward {
        /// Current stage.
        from: Stage,

        /// Requested stage.
        to: Stage,
    },
}

/// Computes the stages to complete for `update`, given the current status.
///
/// # Errors
///
/// Returns a [`TransitionError`] when the transition is not allowed.
pub fn plan_transition(
    current: OrderStatus,
    update: StatusUpdate,
) -> Result<Vec<Stage>, TransitionError> {
    let Some(from) = current.stage() else {
        return Err(TransitionError::Terminal);
    };

    match update {
        StatusUpdate::Cancel if from == Stage::Delivered => Err(TransitionError::AlreadyDelivered),
        StatusUpdate::Cancel => Ok(Vec::new()),
        StatusUpdate::Advance(to) if to <= from => Err(TransitionError::NotForward { from, to }),
        StatusUpdate::Advance(to) => Ok(Stage::ALL
            .into_iter()
            .filter(|stage| *stage > from && *stage <= to)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn initial_stages() {
        let now = Timestamp::UNIX_EPOCH;
        let stages = TrackingStages::initial(now);

        assert!(stages.placed.is_completed());
        assert_eq!(stages.placed.timestamp, Some(now));

        for stage in [Stage::Confirmed, Stage::Shipped, Stage::Delivered] {
            assert_eq!(stages.get(stage).status, StageStatus::Pending);
            assert_eq!(stages.get(stage).timestamp, None);
        }

        assert_eq!(stages.current_stage(), Stage::Placed);
        assert_eq!(stages.cancelled, None);
    }

    #[test]
    fn advancing_one_stage() -> TestResult {
        let planned = plan_transition(OrderStatus::Pending, StatusUpdate::Advance(Stage::Confirmed))?;

        assert_eq!(planned, [Stage::Confirmed]);

        Ok(())
    }

    #[test]
    fn skipping_stages_completes_intermediates() -> TestResult {
        let planned = plan_transition(OrderStatus::Pending, StatusUpdate::Advance(Stage::Delivered))?;

        assert_eq!(planned, [Stage::Confirmed, Stage::Shipped, Stage::Delivered]);

        Ok(())
    }

    #[test]
    fn backwards_and_repeated_moves_are_rejected() {
        assert_eq!(
            plan_transition(OrderStatus::Delivered, StatusUpdate::Advance(Stage::Confirmed)),
            Err(TransitionError::NotForward {
                from: Stage::Delivered,
                to: Stage::Confirmed
            })
        );

        assert_eq!(
            plan_transition(OrderStatus::Shipped, StatusUpdate::Advance(Stage::Shipped)),
            Err(TransitionError::NotForward {
                from: Stage::Shipped,
                to: Stage::Shipped
            })
        );
    }

    #[test]
    fn cancelled_is_terminal() {
        for update in [
            StatusUpdate::Advance(Stage::Confirmed),
            StatusUpdate::Advance(Stage::Delivered),
            StatusUpdate::Cancel,
        ] {
            assert_eq!(
                plan_transition(OrderStatus::Cancelled, update),
                Err(TransitionError::Terminal)
            );
        }
    }

    #[test]
    fn cancel_is_allowed_until_delivery() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
        ] {
            assert_eq!(plan_transition(status, StatusUpdate::Cancel), Ok(Vec::new()));
        }

        assert_eq!(
            plan_transition(OrderStatus::Delivered, StatusUpdate::Cancel),
            Err(TransitionError::AlreadyDelivered)
        );
    }

    #[test]
    fn parses_updates() -> TestResult {
        assert_eq!("shipped".parse::<StatusUpdate>()?, StatusUpdate::Advance(Stage::Shipped));
        assert_eq!("cancelled".parse::<StatusUpdate>()?, StatusUpdate::Cancel);
        assert!("pending".parse::<StatusUpdate>().is_err());
        assert!("lost".parse::<StatusUpdate>().is_err());

        Ok(())
    }

    #[test]
    fn status_round_trips_through_names() -> TestResult {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, status);
        }

        Ok(())
    }

    #[test]
    fn final_statuses_reject_every_update() {
        let updates = [
            StatusUpdate::Advance(Stage::Confirmed),
            StatusUpdate::Advance(Stage::Shipped),
            StatusUpdate::Advance(Stage::Delivered),
            StatusUpdate::Cancel,
        ];

        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let all_rejected = updates
                .iter()
                .all(|update| plan_transition(status, *update).is_err());

            assert_eq!(status.is_final(), all_rejected, "{status}");
        }
    }

    #[test]
    fn complete_sets_message_and_timestamp() {
        let now = Timestamp::UNIX_EPOCH;
        let mut stages = TrackingStages::initial(now);

        stages.complete(Stage::Shipped, now);

        assert_eq!(stages.shipped, StageRecord::completed(now, "Order shipped"));
        assert_eq!(stages.current_stage(), Stage::Shipped);
    }
}
