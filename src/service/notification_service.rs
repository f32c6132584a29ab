//! In-app notification inbox.

use std::sync::Arc;

use crate::domain::{Notification, NotificationId, UserId};
use crate::error::GreenifyError;
use crate::persistence::Store;

/// Lists and acknowledges a user's notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
}

impl NotificationService {
    /// Creates a new `NotificationService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Newest notifications first.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn list(
        &self,
        caller: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, GreenifyError> {
        self.store.notifications(caller, unread_only, limit).await
    }

    /// Marks one notification read.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::NotificationNotFound`] if the caller has
    /// no such notification.
    pub async fn mark_read(&self, caller: &UserId, id: NotificationId) -> Result<(), GreenifyError> {
        if self.store.mark_notification_read(caller, id).await? {
            Ok(())
        } else {
            Err(GreenifyError::NotificationNotFound(id.get()))
        }
    }

    /// Marks every unread notification read; returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::PersistenceError`] on storage failure.
    pub async fn mark_all_read(&self, caller: &UserId) -> Result<u64, GreenifyError> {
        let changed = self.store.mark_all_notifications_read(caller).await?;
        tracing::debug!(user = %caller, changed, "notifications marked read");
        Ok(changed)
    }
}
