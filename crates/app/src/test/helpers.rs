//! Test Helpers

use async_trait::async_trait;
use jiff::Timestamp;
use orebi::{
    cart::{Cart, ValidatedCart},
    customer::SessionUser,
    items::LineItem,
    orders::{Order, OrderId, OrderSettings, assemble},
};
use testresult::TestResult;
use tokio::sync::Notify;

use crate::cart::{CartStore, CheckoutGuard, SharedCart};

/// An order for `user_id` placed at `second`, with an id derived from the time.
pub(crate) fn order_for(user_id: &str, second: i64) -> TestResult<Order> {
    order_at(user_id, second, &format!("ORD-{second:013}-TESTORDER0"))
}

/// An order for `user_id` placed at `second` with the given order id.
pub(crate) fn order_at(user_id: &str, second: i64, order_id: &str) -> TestResult<Order> {
    let cart = ValidatedCart::new(&[
        LineItem::new("tote-1", "Canvas Tote", 450.0, 1),
        LineItem::new("mug-1", "Stoneware Mug", 120.0, 2),
    ])?;

    Ok(assemble(
        cart,
        &SessionUser::new(user_id, format!("{user_id}@example.com")),
        None,
        &OrderSettings::default(),
        Timestamp::from_second(second)?,
        OrderId::from(order_id),
    ))
}

/// Blocks `items` until released, so a checkout can be held mid-flight.
pub(crate) struct GatedCart {
    pub(crate) inner: SharedCart,
    pub(crate) entered: Notify,
    pub(crate) release: Notify,
}

impl GatedCart {
    pub(crate) fn new(cart: Cart) -> Self {
        Self {
            inner: SharedCart::new(cart),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl CartStore for GatedCart {
    async fn items(&self) -> Vec<LineItem> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.items().await
    }

    async fn clear(&self) {
        self.inner.clear().await;
    }

    fn try_begin_checkout(&self) -> Option<CheckoutGuard<'_>> {
        self.inner.try_begin_checkout()
    }
}
