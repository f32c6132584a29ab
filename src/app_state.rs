//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::ai::VisionModel;
use crate::config::GreenifyConfig;
use crate::domain::EventBus;
use crate::error::GreenifyError;
use crate::persistence::Store;
use crate::service::{
    NotificationService, ReportService, RewardPoints, RewardService, UserService,
};
use crate::webhook::WebhookVerifier;

/// Verifiers for the two identity-provider webhooks. `None` when the
/// secret is not configured.
#[derive(Debug, Clone, Default)]
pub struct WebhookVerifiers {
    /// `CLERK_WEBHOOK_SECRET_USER`.
    pub user: Option<WebhookVerifier>,
    /// `CLERK_WEBHOOK_SECRET_SESSION`.
    pub session: Option<WebhookVerifier>,
}

impl WebhookVerifiers {
    /// Builds verifiers from the configured secrets.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::Internal`] if a secret is not valid base64.
    pub fn from_config(config: &GreenifyConfig) -> Result<Self, GreenifyError> {
        let build = |secret: &Option<String>| {
            secret
                .as_deref()
                .map(WebhookVerifier::from_secret)
                .transpose()
        };
        Ok(Self {
            user: build(&config.user_webhook_secret)?,
            session: build(&config.session_webhook_secret)?,
        })
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Report lifecycle.
    pub report_service: Arc<ReportService>,
    /// Balances, redemption and leaderboard.
    pub reward_service: Arc<RewardService>,
    /// Notification inbox.
    pub notification_service: Arc<NotificationService>,
    /// User mirror.
    pub user_service: Arc<UserService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Webhook signature verifiers.
    pub webhooks: WebhookVerifiers,
    /// Storage backend name reported by `/health`.
    pub store_kind: &'static str,
}

impl AppState {
    /// Wires the services over one store and one vision model.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::Internal`] if a webhook secret is invalid.
    pub fn new(
        config: &GreenifyConfig,
        store: Arc<dyn Store>,
        model: Arc<dyn VisionModel>,
        store_kind: &'static str,
    ) -> Result<Self, GreenifyError> {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let report_service = Arc::new(ReportService::new(
            Arc::clone(&store),
            model,
            event_bus.clone(),
            RewardPoints::from(config),
        ));
        Ok(Self {
            report_service,
            reward_service: Arc::new(RewardService::new(Arc::clone(&store))),
            notification_service: Arc::new(NotificationService::new(Arc::clone(&store))),
            user_service: Arc::new(UserService::new(store)),
            event_bus,
            webhooks: WebhookVerifiers::from_config(config)?,
            store_kind,
        })
    }
}
