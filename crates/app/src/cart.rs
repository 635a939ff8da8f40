//! Cart Store
//!
//! The shopper's cart as the checkout sees it: something to read items from
//! and to clear once an order has been written.

use std::sync::atomic::AtomicBool;

use async_trait::async_trait;
use orebi::{cart::Cart, items::LineItem};
use tokio::sync::Mutex;

mod guard;

pub use guard::CheckoutGuard;

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Current cart contents.
    async fn items(&self) -> Vec<LineItem>;

    /// Empties the cart.
    async fn clear(&self);

    /// Claims the cart for one order placement; `None` while another
    /// checkout over the same cart holds it.
    fn try_begin_checkout(&self) -> Option<CheckoutGuard<'_>>;
}

/// A [`Cart`] shared behind an async mutex.
#[derive(Debug, Default)]
pub struct SharedCart {
    cart: Mutex<Cart>,
    checking_out: AtomicBool,
}

impl SharedCart {
    #[must_use]
    pub fn new(cart: Cart) -> Self {
        Self {
            cart: Mutex::new(cart),
            checking_out: AtomicBool::new(false),
        }
    }

    /// Runs `update` against the cart.
    pub async fn update<R>(&self, update: impl FnOnce(&mut Cart) -> R) -> R {
        update(&mut *self.cart.lock().await)
    }
}

#[async_trait]
impl CartStore for SharedCart {
    async fn items(&self) -> Vec<LineItem> {
        self.cart.lock().await.items().to_vec()
    }

    async fn clear(&self) {
        self.cart.lock().await.reset();
    }

    fn try_begin_checkout(&self) -> Option<CheckoutGuard<'_>> {
        CheckoutGuard::acquire(&self.checking_out)
    }
}
