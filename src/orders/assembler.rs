//! Order assembly
//!
//! Combines a validated cart, a customer snapshot and a fresh tracking
//! skeleton into a complete [`Order`]. Pure: no clock reads, no randomness.

use jiff::{Timestamp, ToSpan};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cart::ValidatedCart,
    customer::{CustomerInfo, SessionUser, UserProfile},
    items::total_quantity,
    tracking::{OrderStatus, TrackingStages},
};

use super::{Order, OrderId, OrderMetadata, OrderNotes, PaymentStatus};

/// Hours between placement and the estimated delivery date.
pub const DELIVERY_ESTIMATE_HOURS: i64 = 7 * 24;

/// Per-deployment values stamped onto every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSettings {
    /// Originating channel.
    pub source: String,

    /// Display locale.
    pub locale: String,

    /// Currency code.
    pub currency: String,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            source: "web".to_string(),
            locale: "en-IN".to_string(),
            currency: "INR".to_string(),
        }
    }
}

/// Assembles a complete order placed at `now`.
pub fn assemble(
    cart: ValidatedCart,
    user: &SessionUser,
    profile: Option<&UserProfile>,
    settings: &OrderSettings,
    now: Timestamp,
    order_id: OrderId,
) -> Order {
    let pricing = cart.price_breakdown();
    let items = cart.into_items();
    let item_count = u32::try_from(items.len()).unwrap_or(u32::MAX);

    // Saturates at the far end of the supported range.
    let estimated_delivery = now
        .checked_add(DELIVERY_ESTIMATE_HOURS.hours())
        .unwrap_or(Timestamp::MAX);

    debug!(%order_id, item_count, total = %pricing.total, "assembled order");

    Order {
        user_id: user.id.clone(),
        user_email: user.email.clone(),
        customer_info: CustomerInfo::snapshot(user, profile),
        total_quantity: total_quantity(&items),
        item_count,
        items,
        pricing,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        tracking_stages: TrackingStages::initial(now),
        created_at: now,
        updated_at: now,
        estimated_delivery,
        metadata: OrderMetadata {
            source: settings.source.clone(),
            timestamp: now.as_millisecond(),
            currency: settings.currency.clone(),
            locale: settings.locale.clone(),
        },
        notes: OrderNotes {
            customer: String::new(),
            internal: format!("Order placed via web cart with {item_count} items"),
        },
        order_id,
    }
}
