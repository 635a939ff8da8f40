//! Admin order filtering

use crate::tracking::OrderStatus;

use super::Order;

/// Search and status filter applied to the admin order list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Case-insensitive substring matched against order id, customer name and user email.
    pub search: Option<String>,

    /// Exact status match; `None` means all statuses.
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Filter matching every order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to orders whose id, customer name or email contains `term`.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restricts to one status.
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether `order` passes the filter.
    pub fn matches(&self, order: &Order) -> bool {
        self.matches_status(order) && self.matches_search(order)
    }

    /// Keeps the matching orders, preserving their order.
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|order| self.matches(order)).collect()
    }

    fn matches_status(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
    }

    fn matches_search(&self, order: &Order) -> bool {
        let Some(term) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        else {
            return true;
        };

        let term = term.to_lowercase();

        [
            order.order_id.as_str(),
            order.customer_info.name.as_str(),
            order.user_email.as_str(),
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}
