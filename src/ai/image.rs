//! Image uploads and inline (base64) image payloads.
//!
//! Uploads are validated here, before anything is sent to the model:
//! only `image/*` MIME types up to [`MAX_IMAGE_BYTES`] are accepted.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Serialize;

use crate::error::GreenifyError;

/// Maximum accepted upload size (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// MIME type assumed when a stored data URL does not declare one.
const FALLBACK_MIME: &str = "image/jpeg";

static DATA_URL_META: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^data:([^;,]+)(?:;[^;,]+)*;base64$").ok());

/// A validated image upload.
#[derive(Clone)]
pub struct ImageUpload {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Validates and wraps an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::UnsupportedMediaType`] for non-image MIME
    /// types, [`GreenifyError::ImageTooLarge`] above [`MAX_IMAGE_BYTES`] and
    /// [`GreenifyError::InvalidRequest`] for an empty file.
    pub fn new(mime_type: &str, bytes: Vec<u8>) -> Result<Self, GreenifyError> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(GreenifyError::UnsupportedMediaType(mime_type));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(GreenifyError::ImageTooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        if bytes.is_empty() {
            return Err(GreenifyError::InvalidRequest("image file is empty".to_string()));
        }
        Ok(Self { mime_type, bytes })
    }

    /// MIME type of the upload.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the upload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the upload is empty (never the case after [`Self::new`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64-encodes the upload for the model request.
    #[must_use]
    pub fn to_inline(&self) -> InlineImage {
        InlineImage {
            mime_type: self.mime_type.clone(),
            data: STANDARD.encode(&self.bytes),
        }
    }

    /// Renders the upload as a `data:` URL for storage on a report.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        self.to_inline().to_data_url()
    }
}

/// A base64-encoded image as sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineImage {
    /// Image MIME type.
    pub mime_type: String,
    /// Base64 payload (standard alphabet, padded).
    pub data: String,
}

impl InlineImage {
    /// Parses a `data:<mime>;base64,<payload>` URL.
    ///
    /// A header without a readable MIME type falls back to `image/jpeg`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidRequest`] if `url` is not a base64
    /// data URL or carries an empty payload.
    pub fn from_data_url(url: &str) -> Result<Self, GreenifyError> {
        let not_inline =
            || GreenifyError::InvalidRequest("stored image is not a base64 data URL".to_string());

        let (meta, payload) = url.split_once(',').ok_or_else(not_inline)?;
        if !meta.starts_with("data:") || !meta.ends_with(";base64") {
            return Err(not_inline());
        }
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(not_inline());
        }

        let mime_type = DATA_URL_META
            .as_ref()
            .and_then(|re| re.captures(meta))
            .and_then(|caps| caps.get(1))
            .map_or(FALLBACK_MIME, |m| m.as_str())
            .to_string();

        Ok(Self {
            mime_type,
            data: payload.to_string(),
        })
    }

    /// Renders the image as a `data:` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
