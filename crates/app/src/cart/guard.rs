//! Single-flight guard for order placement against one cart.

use std::sync::atomic::{AtomicBool, Ordering};

/// Held while an order is being placed from a cart; released on drop.
#[derive(Debug)]
pub struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CheckoutGuard<'a> {
    /// Takes the guard, or `None` when another placement holds it.
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_previous| Self { flag })
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
