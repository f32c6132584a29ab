//! Request extractors: caller identity and multipart image forms.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::extract::Multipart;
use axum::http::request::Parts;

use crate::ai::ImageUpload;
use crate::domain::UserId;
use crate::error::GreenifyError;

/// Header carrying the authenticated identity, set by the upstream auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = GreenifyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Self(UserId::new(v)))
            .ok_or_else(|| GreenifyError::Unauthenticated(format!("missing {USER_ID_HEADER} header")))
    }
}

/// A decoded multipart form: at most one image plus text fields.
#[derive(Debug, Default)]
pub struct ImageForm {
    /// The `image` file part, validated.
    pub image: Option<ImageUpload>,
    /// Remaining text fields by name.
    pub fields: HashMap<String, String>,
}

impl ImageForm {
    /// Reads every part of `multipart`.
    ///
    /// The `image` part is validated as it is read, so bad uploads are
    /// rejected before any model call.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidRequest`] for a malformed body, or
    /// the [`ImageUpload::new`] validation errors.
    pub async fn read(mut multipart: Multipart) -> Result<Self, GreenifyError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| GreenifyError::InvalidRequest(format!("multipart: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" || name == "file" {
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| GreenifyError::InvalidRequest(format!("multipart: {e}")))?;
                form.image = Some(ImageUpload::new(&mime, bytes.to_vec())?);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| GreenifyError::InvalidRequest(format!("field {name}: {e}")))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    /// The image part.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidRequest`] if no image was sent.
    pub fn require_image(&mut self) -> Result<ImageUpload, GreenifyError> {
        self.image
            .take()
            .ok_or_else(|| GreenifyError::InvalidRequest("image is required".to_string()))
    }

    /// A text field, blank treated as absent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
