//! End-to-end report lifecycle over HTTP: submit, claim, verify, rewards.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use common::{CLEANED, DIFFERENT_PLACE, TestApp, png_bytes};

const REPORTER: &str = "user_reporter";
const COLLECTOR: &str = "user_collector";

#[tokio::test]
async fn submit_stores_pending_report_and_awards_reporter() {
    let app = TestApp::new();
    app.register(REPORTER).await;

    let id = app.submit_plastic(REPORTER).await;

    let (status, report) = app.get_json(&format!("/api/v1/reports/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["status"], "pending");
    assert_eq!(report["waste_type"], "plastic");
    assert_eq!(report["amount"], "5kg");
    assert!(
        report["image_url"]
            .as_str()
            .is_some_and(|url| url.starts_with("data:image/png;base64,"))
    );
    assert_eq!(report["verification_result"]["decompositionTime"], "450 years");

    let (_, stats) = app.get_json("/api/v1/me/stats", Some(REPORTER)).await;
    assert_eq!(stats["points"], 10);
    assert_eq!(stats["reports_submitted"], 1);
}

#[tokio::test]
async fn claim_then_verify_rewards_collector() {
    let app = TestApp::new();
    app.register(REPORTER).await;
    app.register(COLLECTOR).await;
    let id = app.submit_plastic(REPORTER).await;

    let empty = serde_json::json!({});
    let (status, claimed) = app
        .post_json(&format!("/api/v1/reports/{id}/claim"), Some(COLLECTOR), &empty)
        .await;
    assert_eq!(status, StatusCode::OK, "{claimed}");
    assert_eq!(claimed["status"], "in_progress");
    assert_eq!(claimed["collector_id"], COLLECTOR);

    app.model.push(CLEANED);
    let (status, outcome) = app
        .post_multipart(
            &format!("/api/v1/reports/{id}/verify"),
            COLLECTOR,
            &[("comment", "bagged and removed")],
            Some(("image/png", png_bytes())),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["verified"], true);
    assert_eq!(outcome["points_awarded"], 50);
    assert_eq!(outcome["report"]["status"], "verified");

    let (_, stats) = app.get_json("/api/v1/me/stats", Some(COLLECTOR)).await;
    assert_eq!(stats["points"], 50);
    assert_eq!(stats["wastes_collected"], 1);

    let (_, notifications) = app
        .get_json("/api/v1/me/notifications?unread_only=true", Some(COLLECTOR))
        .await;
    assert_eq!(notifications.as_array().map(Vec::len), Some(1));

    let (_, history) = app.get_json("/api/v1/me/transactions", Some(COLLECTOR)).await;
    assert_eq!(history[0]["type"], "earned_collect");
    assert_eq!(history[0]["amount"], 50);
}

#[tokio::test]
async fn second_claim_conflicts() {
    let app = TestApp::new();
    app.register(REPORTER).await;
    app.register(COLLECTOR).await;
    app.register("user_late").await;
    let id = app.submit_plastic(REPORTER).await;

    let empty = serde_json::json!({});
    let uri = format!("/api/v1/reports/{id}/claim");
    let (first, _) = app.post_json(&uri, Some(COLLECTOR), &empty).await;
    let (second, body) = app.post_json(&uri, Some("user_late"), &empty).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2101);
}

#[tokio::test]
async fn failed_judgment_leaves_report_in_progress() {
    let app = TestApp::new();
    app.register(REPORTER).await;
    app.register(COLLECTOR).await;
    let id = app.submit_plastic(REPORTER).await;
    app.post_json(
        &format!("/api/v1/reports/{id}/claim"),
        Some(COLLECTOR),
        &serde_json::json!({}),
    )
    .await;

    app.model.push(DIFFERENT_PLACE);
    let (status, outcome) = app
        .post_multipart(
            &format!("/api/v1/reports/{id}/verify"),
            COLLECTOR,
            &[],
            Some(("image/png", png_bytes())),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["verified"], false);
    assert_eq!(outcome["reason"], "different_location");
    assert_eq!(outcome["points_awarded"], 0);
    assert_eq!(outcome["report"]["status"], "in_progress");

    let (_, stats) = app.get_json("/api/v1/me/stats", Some(COLLECTOR)).await;
    assert_eq!(stats["points"], 0);
    assert_eq!(stats["wastes_collected"], 0);
}

#[tokio::test]
async fn reply_without_json_mutates_nothing() {
    let app = TestApp::new();
    app.register(REPORTER).await;

    app.model.push("I can't tell what this is.");
    let (status, body) = app
        .post_multipart(
            "/api/v1/reports",
            REPORTER,
            &[("location", "https://maps.google.com/?q=1,2")],
            Some(("image/jpeg", png_bytes())),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "{body}");

    let (_, listing) = app.get_json("/api/v1/reports", None).await;
    assert_eq!(listing["pagination"]["total"], 0);
    let (_, stats) = app.get_json("/api/v1/me/stats", Some(REPORTER)).await;
    assert_eq!(stats["points"], 0);
}

#[tokio::test]
async fn non_waste_photo_is_rejected() {
    let app = TestApp::new();
    app.register(REPORTER).await;

    app.model
        .push(r#"{"wasteType":"none","quantity":"0","confidence":0.8,"imageType":false}"#);
    let (status, body) = app
        .post_multipart(
            "/api/v1/reports",
            REPORTER,
            &[("location", "https://maps.google.com/?q=1,2")],
            Some(("image/png", png_bytes())),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 4002);
}

#[tokio::test]
async fn bad_uploads_never_reach_the_model() {
    let app = TestApp::new();
    app.register(REPORTER).await;
    let location = [("location", "https://maps.google.com/?q=1,2")];

    let (status, _) = app
        .post_multipart(
            "/api/v1/reports",
            REPORTER,
            &location,
            Some(("text/plain", b"hello".to_vec())),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let oversized = vec![0_u8; 10 * 1024 * 1024 + 1];
    let (status, body) = app
        .post_multipart("/api/v1/reports", REPORTER, &location, Some(("image/png", oversized)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1003);

    let (status, _) = app
        .post_multipart(
            "/api/v1/reports",
            REPORTER,
            &[("location", "behind the old mill")],
            Some(("image/png", png_bytes())),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn unregistered_caller_cannot_submit() {
    let app = TestApp::new();
    let (status, _) = app
        .post_multipart(
            "/api/v1/reports",
            "user_ghost",
            &[("location", "https://maps.google.com/?q=1,2")],
            Some(("image/png", png_bytes())),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn missing_caller_header_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app.get_json("/api/v1/me/stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1101);
}

#[tokio::test]
async fn redeem_without_enough_points_is_rejected() {
    let app = TestApp::new();
    app.register(REPORTER).await;
    app.submit_plastic(REPORTER).await;

    let (status, body) = app
        .post_json(
            "/api/v1/rewards/redeem",
            Some(REPORTER),
            &serde_json::json!({ "reward_id": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 4001);

    let (_, stats) = app.get_json("/api/v1/me/stats", Some(REPORTER)).await;
    assert_eq!(stats["points"], 10);
}

#[tokio::test]
async fn task_board_filters_by_status() {
    let app = TestApp::new();
    app.register(REPORTER).await;
    app.register(COLLECTOR).await;
    let first = app.submit_plastic(REPORTER).await;
    app.submit_plastic(REPORTER).await;
    app.post_json(
        &format!("/api/v1/reports/{first}/claim"),
        Some(COLLECTOR),
        &serde_json::json!({}),
    )
    .await;

    let (status, listing) = app.get_json("/api/v1/reports?status=pending", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["pagination"]["total"], 1);
    assert_ne!(listing["data"][0]["id"], first);
}
