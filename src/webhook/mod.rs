//! Signed identity-provider webhooks.
//!
//! [`signature`] verifies Svix-style signatures; [`events`] decodes the
//! verified payloads into [`UserEvent`]s and session flags.

pub mod events;
pub mod signature;

pub use events::{UserEvent, WebhookEnvelope, session_active};
pub use signature::{SignatureHeaders, WebhookVerifier};
