//! Vision model client.
//!
//! [`VisionModel`] is the seam between the workflow and the hosted model:
//! it takes an instruction prompt plus inline images and returns the
//! model's free-text reply. [`GeminiClient`] is the production
//! implementation over the `generateContent` REST endpoint.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::image::InlineImage;
use crate::config::GreenifyConfig;
use crate::error::GreenifyError;

/// A multimodal model that answers a text prompt about zero or more images.
#[async_trait]
pub trait VisionModel: Send + Sync + fmt::Debug {
    /// Sends `prompt` followed by `images` and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::ModelRequest`] when the endpoint is
    /// unreachable, answers with an error, or returns no text.
    async fn generate(&self, prompt: &str, images: &[InlineImage])
    -> Result<String, GreenifyError>;
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Builds a client from the service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::Internal`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &GreenifyConfig) -> Result<Self, GreenifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.gemini_timeout_secs))
            .build()
            .map_err(|e| GreenifyError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

fn build_request<'a>(prompt: &'a str, images: &'a [InlineImage]) -> GenerateRequest<'a> {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(Part::Text { text: prompt });
    parts.extend(images.iter().map(|img| Part::Inline {
        inline_data: InlineData {
            mime_type: &img.mime_type,
            data: &img.data,
        },
    }));
    GenerateRequest {
        contents: [Content { parts }],
    }
}

/// Reads `candidates[0].content.parts[0].text`.
fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        images: &[InlineImage],
    ) -> Result<String, GreenifyError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GreenifyError::ModelRequest("GEMINI_API_KEY is not configured".to_string())
        })?;

        tracing::debug!(model = %self.model, images = images.len(), "calling vision model");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&build_request(prompt, images))
            .send()
            .await
            .map_err(|e| GreenifyError::ModelRequest(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GreenifyError::ModelRequest(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error)
                .and_then(|err| err.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!(%status, %message, "vision model returned an error");
            return Err(GreenifyError::ModelRequest(format!(
                "API error ({status}): {message}"
            )));
        }

        let parsed: GenerateResponse = serde_json::from_slice(&body)
            .map_err(|e| GreenifyError::ModelRequest(format!("unreadable response: {e}")))?;

        first_text(parsed).ok_or_else(|| {
            GreenifyError::ModelRequest("invalid response format: no candidate text".to_string())
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn request_body_mixes_prompt_and_images() {
        let images = vec![
            InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            },
            InlineImage {
                mime_type: "image/jpeg".to_string(),
                data: "BBBB".to_string(),
            },
        ];
        let body = serde_json::to_value(build_request("compare", &images)).unwrap_or_default();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "compare");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[2]["inline_data"]["data"], "BBBB");
        assert_eq!(parts.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn reads_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":1}"},{"text":"ignored"}]}}]}"#;
        let Ok(parsed) = serde_json::from_str::<GenerateResponse>(raw) else {
            panic!("response should parse");
        };
        assert_eq!(first_text(parsed).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let Ok(parsed) = serde_json::from_str::<GenerateResponse>(r#"{"candidates":[]}"#) else {
            panic!("response should parse");
        };
        assert!(first_text(parsed).is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GreenifyConfig::default();
        let Ok(mut client) = GeminiClient::from_config(&config) else {
            panic!("client should build");
        };
        client.api_key = Some("secret-key".to_string());
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(client.endpoint().ends_with(":generateContent"));
    }
}
