//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{Timestamp, Zoned};
use mockall::automock;
use orebi::{
    orders::{Order, OrderFilter, OrderHistoryEntry, OrderStats},
    tracking::StatusUpdate,
};
use tracing::{Span, info};

use crate::{
    domain::orders::{
        errors::OrdersServiceError,
        repository::{OrdersRepository, SavedOrder, StoredOrder},
    },
    store::DocumentStore,
};

#[derive(Debug, Clone)]
pub struct StoreOrdersService {
    repository: OrdersRepository,
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repository: OrdersRepository::new(store),
        }
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self, order),
        fields(
            order_id = %order.order_id,
            user_id = %order.user_id,
            total = %order.pricing.total,
            document_id = tracing::field::Empty
        ),
        err
    )]
    async fn place_order(&self, order: Order) -> Result<SavedOrder, OrdersServiceError> {
        let saved = self.repository.save(&order).await?;

        Span::current().record("document_id", tracing::field::display(&saved.document_id));

        info!(
            history_recorded = saved.history_recorded,
            items = order.item_count,
            "placed order"
        );

        Ok(saved)
    }

    #[tracing::instrument(name = "orders.service.get_order", skip(self), err)]
    async fn get_order(&self, document_id: &str) -> Result<StoredOrder, OrdersServiceError> {
        self.repository
            .find(document_id)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }

    #[tracing::instrument(name = "orders.service.list_user_orders", skip(self), err)]
    async fn list_user_orders(&self, user_id: &str) -> Result<Vec<StoredOrder>, OrdersServiceError> {
        Ok(self.repository.list_for_user(user_id).await?)
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self, filter),
        fields(
            search = filter.search.as_deref(),
            status = filter.status.map(|status| status.as_str())
        ),
        err
    )]
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<StoredOrder>, OrdersServiceError> {
        let mut orders = self.repository.list_all().await?;

        orders.retain(|stored| filter.matches(&stored.order));

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_id = tracing::field::Empty),
        err
    )]
    async fn update_status(
        &self,
        document_id: &str,
        update: StatusUpdate,
        at: Timestamp,
    ) -> Result<StoredOrder, OrdersServiceError> {
        let StoredOrder {
            document_id,
            mut order,
        } = self.get_order(document_id).await?;

        Span::current().record("order_id", tracing::field::display(&order.order_id));

        let change = order.apply(update, at)?;

        let history_recorded = self
            .repository
            .update_status(&document_id, &order, &change)
            .await?;

        info!(
            from = %change.from,
            to = %change.to,
            completed = change.completed.len(),
            history_recorded,
            "updated order status"
        );

        Ok(StoredOrder { document_id, order })
    }

    #[tracing::instrument(name = "orders.service.order_history", skip(self), err)]
    async fn order_history(
        &self,
        document_id: &str,
    ) -> Result<Vec<OrderHistoryEntry>, OrdersServiceError> {
        Ok(self.repository.history(document_id).await?)
    }

    #[tracing::instrument(name = "orders.service.order_stats", skip(self, now), err)]
    async fn order_stats(&self, now: Zoned) -> Result<OrderStats, OrdersServiceError> {
        let orders: Vec<Order> = self
            .repository
            .list_all()
            .await?
            .into_iter()
            .map(|stored| stored.order)
            .collect();

        Ok(OrderStats::collect(&orders, &now))
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Writes a new order and its `order_created` history entry.
    async fn place_order(&self, order: Order) -> Result<SavedOrder, OrdersServiceError>;

    /// Retrieve a single order by document id.
    async fn get_order(&self, document_id: &str) -> Result<StoredOrder, OrdersServiceError>;

    /// A user's orders, newest first.
    async fn list_user_orders(&self, user_id: &str) -> Result<Vec<StoredOrder>, OrdersServiceError>;

    /// All orders matching the filter, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<StoredOrder>, OrdersServiceError>;

    /// Advances or cancels an order.
    async fn update_status(
        &self,
        document_id: &str,
        update: StatusUpdate,
        at: Timestamp,
    ) -> Result<StoredOrder, OrdersServiceError>;

    /// History entries for an order, oldest first.
    async fn order_history(
        &self,
        document_id: &str,
    ) -> Result<Vec<OrderHistoryEntry>, OrdersServiceError>;

    /// Dashboard aggregates as of `now`.
    async fn order_stats(&self, now: Zoned) -> Result<OrderStats, OrdersServiceError>;
}
