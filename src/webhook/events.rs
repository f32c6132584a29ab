//! Identity-provider webhook payloads.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{UserId, UserProfile};
use crate::error::GreenifyError;

const ANONYMOUS: &str = "Anonymous User";

/// Outer shape shared by all events: `{"type": .., "data": {..}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    /// Event type, e.g. `user.created`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Event payload.
    pub data: Option<Value>,
}

impl WebhookEnvelope {
    /// Parses a verified request body.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidRequest`] if the body is not JSON.
    pub fn parse(body: &[u8]) -> Result<Self, GreenifyError> {
        serde_json::from_slice(body)
            .map_err(|e| GreenifyError::InvalidRequest(format!("webhook body: {e}")))
    }

    fn require(self) -> Result<(String, Value), GreenifyError> {
        match (self.kind, self.data) {
            (Some(kind), Some(data)) if !kind.is_empty() && !data.is_null() => Ok((kind, data)),
            _ => Err(GreenifyError::InvalidRequest(
                "webhook payload requires type and data".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
}

impl UserData {
    fn into_profile(self) -> UserProfile {
        let full_name = display_name(
            self.full_name.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        );
        let email = self
            .email_addresses
            .into_iter()
            .next()
            .map(|e| e.email_address)
            .unwrap_or_default();
        UserProfile {
            clerk_id: UserId::new(self.id),
            email,
            full_name,
            profile_image: self.image_url.filter(|url| !url.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeletedData {
    id: String,
}

/// `full_name`, else `"first last"`, else `Anonymous User`.
fn display_name(full: Option<&str>, first: Option<&str>, last: Option<&str>) -> String {
    if let Some(full) = full.map(str::trim).filter(|s| !s.is_empty()) {
        return full.to_string();
    }
    let joined = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let joined = joined.trim();
    if joined.is_empty() {
        ANONYMOUS.to_string()
    } else {
        joined.to_string()
    }
}

/// A user event to mirror locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// `user.created`.
    Created(UserProfile),
    /// `user.updated`.
    Updated(UserProfile),
    /// `user.deleted`.
    Deleted(UserId),
    /// Any other event type.
    Ignored(String),
}

impl UserEvent {
    /// Decodes a user webhook envelope.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidRequest`] if `type` or `data` is
    /// missing or `data` lacks the fields for its event type.
    pub fn from_envelope(envelope: WebhookEnvelope) -> Result<Self, GreenifyError> {
        let (kind, data) = envelope.require()?;
        let bad_data =
            |e: serde_json::Error| GreenifyError::InvalidRequest(format!("{kind} data: {e}"));
        match kind.as_str() {
            "user.created" => Ok(Self::Created(
                serde_json::from_value::<UserData>(data)
                    .map_err(bad_data)?
                    .into_profile(),
            )),
            "user.updated" => Ok(Self::Updated(
                serde_json::from_value::<UserData>(data)
                    .map_err(bad_data)?
                    .into_profile(),
            )),
            "user.deleted" => {
                let deleted: DeletedData = serde_json::from_value(data).map_err(bad_data)?;
                Ok(Self::Deleted(UserId::new(deleted.id)))
            }
            _ => Ok(Self::Ignored(kind.clone())),
        }
    }
}

/// Session validity flag: `true` for `session.created`, `false` for
/// `session.ended` and anything else.
///
/// # Errors
///
/// Returns [`GreenifyError::InvalidRequest`] if `type` or `data` is missing.
pub fn session_active(envelope: WebhookEnvelope) -> Result<bool, GreenifyError> {
    let (kind, _) = envelope.require()?;
    Ok(kind == "session.created")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn envelope(raw: &str) -> WebhookEnvelope {
        let Ok(env) = WebhookEnvelope::parse(raw.as_bytes()) else {
            panic!("envelope should parse");
        };
        env
    }

    #[test]
    fn created_uses_first_email_and_joined_name() {
        let env = envelope(
            r#"{"type":"user.created","data":{"id":"user_1","first_name":"Ada","last_name":"Lovelace",
            "image_url":"https://img.example/a.png",
            "email_addresses":[{"email_address":"ada@example.com","id":"e1"},{"email_address":"x@example.com","id":"e2"}]}}"#,
        );
        let Ok(UserEvent::Created(profile)) = UserEvent::from_envelope(env) else {
            panic!("expected created event");
        };
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.profile_image.as_deref(), Some("https://img.example/a.png"));
    }

    #[test]
    fn name_falls_back_to_anonymous() {
        assert_eq!(display_name(None, None, None), ANONYMOUS);
        assert_eq!(display_name(Some("  "), Some(""), None), ANONYMOUS);
        assert_eq!(display_name(None, Some("Ada"), None), "Ada");
        assert_eq!(display_name(Some("Countess"), Some("Ada"), None), "Countess");
    }

    #[test]
    fn deleted_only_needs_id() {
        let env = envelope(r#"{"type":"user.deleted","data":{"id":"user_1","deleted":true}}"#);
        assert_eq!(
            UserEvent::from_envelope(env).ok(),
            Some(UserEvent::Deleted(UserId::from("user_1")))
        );
    }

    #[test]
    fn unknown_type_is_ignored() {
        let env = envelope(r#"{"type":"email.created","data":{}}"#);
        assert!(matches!(
            UserEvent::from_envelope(env),
            Ok(UserEvent::Ignored(_))
        ));
    }

    #[test]
    fn session_flag_follows_type() {
        assert_eq!(session_active(envelope(r#"{"type":"session.created","data":{}}"#)).ok(), Some(true));
        assert_eq!(session_active(envelope(r#"{"type":"session.ended","data":{}}"#)).ok(), Some(false));
        assert_eq!(session_active(envelope(r#"{"type":"session.revoked","data":{}}"#)).ok(), Some(false));
        assert!(session_active(envelope(r#"{"data":{}}"#)).is_err());
        assert!(session_active(envelope(r#"{"type":"session.created"}"#)).is_err());
    }
}
