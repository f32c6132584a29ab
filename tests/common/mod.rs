//! Shared harness: the full router over an in-memory store and a scripted
//! vision model.

#![allow(dead_code, clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tower::ServiceExt;

use greenify_server::ai::{InlineImage, VisionModel};
use greenify_server::api;
use greenify_server::app_state::AppState;
use greenify_server::config::GreenifyConfig;
use greenify_server::domain::{UserId, UserProfile};
use greenify_server::error::GreenifyError;
use greenify_server::persistence::{MemoryStore, Store};

pub const USER_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
pub const SESSION_SECRET: &str = "whsec_c2Vzc2lvbi1zZWNyZXQtZm9yLXRlc3Rz";

pub const CLASSIFY_PLASTIC: &str = r#"Sure! {"wasteType":"plastic","quantity":"5kg","confidence":0.92,"imageType":true,"decompositionTime":"450 years"}"#;
pub const CLEANED: &str = r#"```json
{"sameLocation":true,"firstImageHasWaste":true,"cleanupStatus":"fully cleaned","wasteType":"plastic","comments":"All clear"}
```"#;
pub const DIFFERENT_PLACE: &str = r#"{"sameLocation":false,"firstImageHasWaste":true,"cleanupStatus":"fully cleaned"}"#;

const BOUNDARY: &str = "greenify-test-boundary";

/// Vision model that replays canned replies in order.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn push(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(reply.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn generate(
        &self,
        _prompt: &str,
        _images: &[InlineImage],
    ) -> Result<String, GreenifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GreenifyError::ModelRequest("no scripted reply".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<ScriptedModel>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = GreenifyConfig {
            user_webhook_secret: Some(USER_SECRET.to_string()),
            session_webhook_secret: Some(SESSION_SECRET.to_string()),
            ..GreenifyConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let model = Arc::new(ScriptedModel::default());
        let state = AppState::new(
            &config,
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::clone(&model) as Arc<dyn VisionModel>,
            "memory",
        )
        .expect("state");
        Self {
            router: api::build_app(state),
            model,
            store,
        }
    }

    /// Mirrors a user directly, bypassing the webhook.
    pub async fn register(&self, id: &str) {
        let profile = UserProfile {
            clerk_id: UserId::from(id),
            email: format!("{id}@example.com"),
            full_name: format!("User {id}"),
            profile_image: None,
        };
        self.store.insert_user_if_absent(&profile).await.unwrap();
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get_json(&self, uri: &str, user: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::get(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        json_response(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        user: Option<&str>,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        json_response(self.send(request).await).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        user: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, Vec<u8>)>,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("x-user-id", user)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, image)))
            .unwrap();
        json_response(self.send(request).await).await
    }

    /// Submits a plastic report as `user` and returns its ID.
    pub async fn submit_plastic(&self, user: &str) -> i64 {
        self.model.push(CLASSIFY_PLASTIC);
        let (status, body) = self
            .post_multipart(
                "/api/v1/reports",
                user,
                &[("location", "https://maps.google.com/?q=41.39,2.17")],
                Some(("image/png", png_bytes())),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["report"]["id"].as_i64().unwrap()
    }
}

pub fn png_bytes() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4]
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, Vec<u8>)>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((mime, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn json_response(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
