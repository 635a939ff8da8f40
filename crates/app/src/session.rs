//! Session & Profiles
//!
//! Who is checking out, and what we know about them.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use orebi::{
    customer::{SessionUser, UserProfile},
    document::{DecodeError, from_document, sanitize_document, to_document},
};
use thiserror::Error;

use crate::store::{DocumentStore, StoreError, USERS_COLLECTION};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to load user profile")]
    Store(#[from] StoreError),

    #[error("user profile is malformed")]
    Malformed(#[from] DecodeError),
}

/// Source of the authenticated user.
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<SessionUser>;
}

/// A session fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<SessionUser>,
}

impl StaticSession {
    #[must_use]
    pub fn signed_in(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<SessionUser> {
        self.user.clone()
    }
}

#[automock]
#[async_trait]
pub trait UserProfiles: Send + Sync {
    /// Loads the stored profile for a user; `None` if there is none.
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError>;
}

/// Profiles read from the `users` collection, one document per user id.
#[derive(Clone)]
pub struct StoreUserProfiles {
    store: Arc<dyn DocumentStore>,
}

impl StoreUserProfiles {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Writes a profile, as sign-up does.
    ///
    /// # Errors
    ///
    /// Returns an error when the store write fails.
    pub async fn save_user_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), ProfileError> {
        self.store
            .set_document(
                USERS_COLLECTION,
                user_id,
                sanitize_document(to_document(profile).map_err(StoreError::from)?),
            )
            .await?;

        Ok(())
    }
}

impl std::fmt::Debug for StoreUserProfiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreUserProfiles").finish_non_exhaustive()
    }
}

#[async_trait]
impl UserProfiles for StoreUserProfiles {
    #[tracing::instrument(name = "session.profiles.get_user_profile", skip(self), err)]
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        let Some(document) = self.store.get_document(USERS_COLLECTION, user_id).await? else {
            return Ok(None);
        };

        Ok(Some(from_document(&document)?))
    }
}
