//! Integration tests for moving orders through the tracking stages

use jiff::{Timestamp, ToSpan};
use testresult::TestResult;

use orebi::{
    cart::ValidatedCart,
    customer::SessionUser,
    document::{get_path, sanitize_document},
    items::LineItem,
    orders::{HistoryAction, Order, OrderHistoryEntry, OrderId, OrderSettings, assemble},
    tracking::{OrderStatus, Stage, StageStatus, StatusUpdate, TransitionError},
};

fn placed() -> TestResult<Order> {
    Ok(assemble(
        ValidatedCart::new(&[LineItem::new("a", "Tote", 450.0, 1)])?,
        &SessionUser::new("user-1", "asha@example.com"),
        None,
        &OrderSettings::default(),
        Timestamp::from_millisecond(1_700_000_000_000)?,
        OrderId::from("ORD-1700000000000-TESTTESTTE"),
    ))
}

#[test]
fn order_walks_the_full_pipeline() -> TestResult {
    let mut order = placed()?;
    let mut at = order.created_at;

    for name in ["confirmed", "shipped", "delivered"] {
        at = at.checked_add(24.hours())?;

        let change = order.apply(name.parse::<StatusUpdate>()?, at)?;
        let entry = OrderHistoryEntry::status_changed(&order.order_id, &change);

        assert_eq!(order.status.as_str(), name);
        assert_eq!(entry.action, HistoryAction::StatusUpdated);
    }

    assert_eq!(order.order_stage(), Stage::Delivered);
    assert_eq!(order.updated_at, at);
    assert!(order.status.is_final());

    for stage in Stage::ALL {
        assert_eq!(order.tracking_stages.get(stage).status, StageStatus::Completed);
    }

    Ok(())
}

#[test]
fn stored_stage_fields_follow_transitions() -> TestResult {
    let mut order = placed()?;
    let at = order.created_at.checked_add(5.hours())?;

    order.apply(StatusUpdate::Advance(Stage::Shipped), at)?;

    let document = sanitize_document(order.to_document()?);
    let text = |path: &str| get_path(&document, path).and_then(|v| v.as_str().map(str::to_string));

    assert_eq!(text("status").as_deref(), Some("shipped"));
    assert_eq!(text("orderStage").as_deref(), Some("shipped"));
    assert_eq!(text("trackingStages.confirmed.message").as_deref(), Some("Order confirmed"));
    assert_eq!(text("trackingStages.shipped.status").as_deref(), Some("completed"));
    assert_eq!(text("trackingStages.delivered.status").as_deref(), Some("pending"));

    Ok(())
}

#[test]
fn cancellation_locks_the_order() -> TestResult {
    let mut order = placed()?;
    let at = order.created_at.checked_add(1.hour())?;

    order.apply(StatusUpdate::Advance(Stage::Confirmed), at)?;

    let change = order.apply(StatusUpdate::Cancel, at)?;
    let entry = OrderHistoryEntry::status_changed(&order.order_id, &change);

    assert_eq!(entry.action, HistoryAction::OrderCancelled);
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.order_stage(), Stage::Confirmed);

    for update in [StatusUpdate::Advance(Stage::Delivered), StatusUpdate::Cancel] {
        let result = order.apply(update, at);

        assert!(
            matches!(result, Err(TransitionError::Terminal)),
            "expected Terminal, got {result:?}"
        );
    }

    Ok(())
}
