//! Checkout
//!
//! Turns the current cart into a persisted order: check the session,
//! validate the cart, snapshot the customer, write the order, then clear
//! the cart. The cart is only cleared once the order write has succeeded.

use std::sync::Arc;

use jiff::Timestamp;
use orebi::{
    cart::ValidatedCart,
    orders::{Order, OrderId, OrderSettings, assemble},
};
use tracing::{Span, info, warn};

use crate::{
    cart::CartStore,
    domain::orders::OrdersService,
    session::{SessionProvider, UserProfiles},
};

mod errors;

pub use errors::CheckoutError;

/// What the shopper sees after a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub order_id: OrderId,
    pub document_id: String,

    /// Whether the `order_created` history entry was written.
    pub history_recorded: bool,

    pub order: Order,
}

pub struct Checkout {
    session: Arc<dyn SessionProvider>,
    profiles: Arc<dyn UserProfiles>,
    orders: Arc<dyn OrdersService>,
    cart: Arc<dyn CartStore>,
    settings: OrderSettings,
}

impl Checkout {
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionProvider>,
        profiles: Arc<dyn UserProfiles>,
        orders: Arc<dyn OrdersService>,
        cart: Arc<dyn CartStore>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            session,
            profiles,
            orders,
            cart,
            settings,
        }
    }

    /// Places an order for the current cart with a freshly generated id.
    ///
    /// # Errors
    ///
    /// See [`Checkout::place_order_at`].
    pub async fn place_order(&self) -> Result<Confirmation, CheckoutError> {
        let now = Timestamp::now();
        let order_id = OrderId::generate(now, &mut rand::thread_rng());

        self.place_order_at(now, order_id).await
    }

    /// Places an order for the current cart, stamped with `now`.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AlreadyInProgress`]: another placement from the same cart is running.
    /// - [`CheckoutError::AuthenticationMissing`]: nobody is signed in.
    /// - [`CheckoutError::Validation`]: the cart is empty or out of range.
    /// - [`CheckoutError::Persistence`]: the order write failed; the cart is left as it was.
    #[tracing::instrument(
        name = "checkout.place_order",
        skip(self, now),
        fields(order_id = %order_id, user_id = tracing::field::Empty),
        err
    )]
    pub async fn place_order_at(
        &self,
        now: Timestamp,
        order_id: OrderId,
    ) -> Result<Confirmation, CheckoutError> {
        let Some(_checkout) = self.cart.try_begin_checkout() else {
            return Err(CheckoutError::AlreadyInProgress);
        };

        let user = self
            .session
            .current_user()
            .ok_or(CheckoutError::AuthenticationMissing)?;

        Span::current().record("user_id", tracing::field::display(&user.id));

        let cart = ValidatedCart::new(&self.cart.items().await)?;

        let profile = match self.profiles.get_user_profile(&user.id).await {
            Ok(profile) => profile,
            Err(error) => {
                warn!(error = %error, "failed to load user profile, using defaults");

                None
            }
        };

        let order = assemble(
            cart,
            &user,
            profile.as_ref(),
            &self.settings,
            now,
            order_id,
        );

        let saved = self
            .orders
            .place_order(order.clone())
            .await
            .map_err(CheckoutError::Persistence)?;

        self.cart.clear().await;

        info!(
            document_id = %saved.document_id,
            total = %order.pricing.total,
            "checkout complete"
        );

        Ok(Confirmation {
            order_id: order.order_id.clone(),
            document_id: saved.document_id,
            history_recorded: saved.history_recorded,
            order,
        })
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
