//! Local user mirror maintained from identity-provider events.

use std::sync::Arc;

use crate::domain::{User, UserId, UserProfile};
use crate::error::GreenifyError;
use crate::persistence::Store;
use crate::webhook::UserEvent;

/// Applies identity-provider user events and serves profiles.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Mirrors one user event into the store.
    ///
    /// `user.created` for an existing user and `user.updated` for an
    /// unknown one are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn apply(&self, event: UserEvent) -> Result<(), GreenifyError> {
        match event {
            UserEvent::Created(profile) => self.created(&profile).await,
            UserEvent::Updated(profile) => self.updated(&profile).await,
            UserEvent::Deleted(id) => self.deleted(&id).await,
            UserEvent::Ignored(kind) => {
                tracing::debug!(event = %kind, "ignoring user webhook event");
                Ok(())
            }
        }
    }

    async fn created(&self, profile: &UserProfile) -> Result<(), GreenifyError> {
        if self.store.insert_user_if_absent(profile).await? {
            tracing::info!(user = %profile.clerk_id, "user mirrored");
        } else {
            tracing::info!(user = %profile.clerk_id, "user already exists");
        }
        Ok(())
    }

    async fn updated(&self, profile: &UserProfile) -> Result<(), GreenifyError> {
        if self.store.update_user(profile).await? {
            tracing::info!(user = %profile.clerk_id, "user updated");
        } else {
            tracing::warn!(user = %profile.clerk_id, "update for unknown user");
        }
        Ok(())
    }

    async fn deleted(&self, id: &UserId) -> Result<(), GreenifyError> {
        if self.store.soft_delete_user(id).await? {
            tracing::info!(user = %id, "user deleted");
        }
        Ok(())
    }

    /// Loads the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::UserNotFound`] if the user is not mirrored.
    pub async fn profile(&self, id: &UserId) -> Result<User, GreenifyError> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| GreenifyError::UserNotFound(id.to_string()))
    }
}
