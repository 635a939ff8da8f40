//! Dashboard aggregates over placed orders.

use jiff::Zoned;
use rust_decimal::Decimal;

use crate::tracking::OrderStatus;

use super::Order;

/// Number of orders listed under "recent".
pub const RECENT_ORDERS: usize = 5;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStats {
    /// All orders.
    pub total_orders: usize,

    /// Sum of order totals.
    pub total_revenue: Decimal,

    /// Sum of totals for orders placed in the current calendar month.
    pub monthly_revenue: Decimal,

    /// Orders still awaiting confirmation.
    pub pending_orders: usize,

    /// Most recently placed orders, newest first.
    pub recent: Vec<Order>,
}

impl OrderStats {
    /// Aggregates `orders`, using `now` (and its time zone) to find the current month.
    pub fn collect(orders: &[Order], now: &Zoned) -> Self {
        let in_current_month = |order: &Order| {
            let placed = order.created_at.to_zoned(now.time_zone().clone());

            placed.year() == now.year() && placed.month() == now.month()
        };

        let mut recent: Vec<Order> = orders.to_vec();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_ORDERS);

        Self {
            total_orders: orders.len(),
            total_revenue: revenue(orders.iter()),
            monthly_revenue: revenue(orders.iter().filter(|order| in_current_month(order))),
            pending_orders: orders
                .iter()
                .filter(|order| order.status == OrderStatus::Pending)
                .count(),
            recent,
        }
    }
}

fn revenue<'a>(orders: impl Iterator<Item = &'a Order>) -> Decimal {
    orders.fold(Decimal::ZERO, |acc, order| {
        acc.saturating_add(order.pricing.total)
    })
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan, tz::TimeZone};
    use testresult::TestResult;

    use crate::{
        cart::ValidatedCart,
        customer::SessionUser,
        items::LineItem,
        orders::{OrderId, OrderSettings, assemble},
        tracking::{Stage, StatusUpdate},
    };

    use super::*;

    fn order(id: &str, price: f64, placed: Timestamp) -> TestResult<Order> {
        Ok(assemble(
            ValidatedCart::new(&[LineItem::new("a", "A", price, 1)])?,
            &SessionUser::new("u", "u@example.com"),
            None,
            &OrderSettings::default(),
            placed,
            OrderId::from(id),
        ))
    }

    #[test]
    fn empty_list() {
        let now = Timestamp::UNIX_EPOCH.to_zoned(TimeZone::UTC);
        let stats = OrderStats::collect(&[], &now);

        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(stats.monthly_revenue, Decimal::ZERO);
        assert_eq!(stats.pending_orders, 0);
        assert!(stats.recent.is_empty());
    }

    #[test]
    fn aggregates_revenue_and_pending() -> TestResult {
        // 2024-03-15T12:00:00Z
        let now = Timestamp::from_second(1_710_504_000)?;
        let last_month = now.checked_sub(744.hours())?;

        let mut shipped = order("ORD-2", 100.0, now)?;
        shipped.apply(StatusUpdate::Advance(Stage::Shipped), now)?;

        let orders = vec![
            order("ORD-1", 600.0, last_month)?,
            shipped,
            order("ORD-3", 300.0, now.checked_sub(1.hour())?)?,
        ];

        let stats = OrderStats::collect(&orders, &now.to_zoned(TimeZone::UTC));

        // 693 + 148 + 379
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_revenue, Decimal::from(1220));
        assert_eq!(stats.monthly_revenue, Decimal::from(527));
        assert_eq!(stats.pending_orders, 2);

        Ok(())
    }

    #[test]
    fn recent_is_newest_first_and_capped() -> TestResult {
        let base = Timestamp::from_second(1_710_504_000)?;

        let orders = (0..7_i64)
            .map(|n| order(&format!("ORD-{n}"), 10.0, base.checked_add(n.hours())?))
            .collect::<TestResult<Vec<_>>>()?;

        let stats = OrderStats::collect(&orders, &base.to_zoned(TimeZone::UTC));

        let ids: Vec<_> = stats.recent.iter().map(|o| o.order_id.to_string()).collect();

        assert_eq!(ids, ["ORD-6", "ORD-5", "ORD-4", "ORD-3", "ORD-2"]);

        Ok(())
    }
}
