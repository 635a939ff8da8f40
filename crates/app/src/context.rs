//! App Context

use std::sync::Arc;

use orebi::orders::OrderSettings;

use crate::{
    cart::CartStore,
    checkout::Checkout,
    domain::orders::{OrdersService, StoreOrdersService},
    session::{SessionProvider, StoreUserProfiles, UserProfiles},
    store::{DocumentStore, MemoryDocumentStore},
};

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub orders: Arc<dyn OrdersService>,
    pub profiles: Arc<dyn UserProfiles>,
    pub settings: OrderSettings,
}

impl AppContext {
    /// Build application context over the given document store.
    #[must_use]
    pub fn from_store(store: Arc<dyn DocumentStore>, settings: OrderSettings) -> Self {
        Self {
            orders: Arc::new(StoreOrdersService::new(store.clone())),
            profiles: Arc::new(StoreUserProfiles::new(store.clone())),
            store,
            settings,
        }
    }

    /// Build application context over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(settings: OrderSettings) -> Self {
        Self::from_store(Arc::new(MemoryDocumentStore::new()), settings)
    }

    /// A checkout for one session and cart.
    #[must_use]
    pub fn checkout(
        &self,
        session: Arc<dyn SessionProvider>,
        cart: Arc<dyn CartStore>,
    ) -> Checkout {
        Checkout::new(
            session,
            self.profiles.clone(),
            self.orders.clone(),
            cart,
            self.settings.clone(),
        )
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
