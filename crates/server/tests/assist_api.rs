mod common;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::{StatusCode, header};
use common::TestApp;
use serde_json::json;
use services::services::{
    assist::{AssistError, AssistService, TextGenerator},
    config::{Config, RateLimitConfig},
};

struct FixedReply(&'static str);

#[async_trait]
impl TextGenerator for FixedReply {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AssistError> {
        Ok(self.0.to_string())
    }
}

struct FailingGenerator(u16);

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AssistError> {
        Err(AssistError::from_status(self.0, "upstream said no"))
    }
}

async fn app_with_generator(generator: impl TextGenerator + 'static) -> TestApp {
    TestApp::with(
        Config::default(),
        AssistService::with_generator(Arc::new(generator)),
    )
    .await
}

#[tokio::test]
async fn test_unconfigured_assist_is_unavailable() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/ai/generate", json!({"type": "text", "prompt": "Hello"}))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_board_from_model_json() {
    let app = app_with_generator(FixedReply(
        r#"{"name": "Recipe App", "description": "Plan the recipe app"}"#,
    ))
    .await;

    let (status, body) = app
        .post(
            "/api/ai/generate",
            json!({"type": "board_name", "prompt": "An app for recipes"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "model");
    assert_eq!(body["data"]["suggestion"]["kind"], "board");
    assert_eq!(body["data"]["suggestion"]["name"], "Recipe App");
}

#[tokio::test]
async fn test_generate_text_passes_reply_through() {
    let app = app_with_generator(FixedReply("Break the work into small tasks.")).await;

    let (status, body) = app
        .post(
            "/api/ai/generate",
            json!({"type": "text", "prompt": "Advice?", "context": {"board": "Sprint 1"}}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["suggestion"]["kind"], "plain_text");
    assert_eq!(
        body["data"]["suggestion"]["text"],
        "Break the work into small tasks."
    );
}

#[tokio::test]
async fn test_upstream_rate_limit_degrades_to_canned() {
    let app = app_with_generator(FailingGenerator(429)).await;

    let (status, body) = app
        .post(
            "/api/ai/generate",
            json!({"type": "tasks", "prompt": "marketing launch"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "canned");
    assert_eq!(body["data"]["suggestion"]["kind"], "task_list");
    assert!(!body["data"]["suggestion"]["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_errors_map_to_status() {
    let cases = [
        (401, StatusCode::UNAUTHORIZED),
        (403, StatusCode::FORBIDDEN),
        (500, StatusCode::BAD_GATEWAY),
    ];

    for (upstream, expected) in cases {
        let app = app_with_generator(FailingGenerator(upstream)).await;
        let (status, body) = app
            .post("/api/ai/generate", json!({"type": "text", "prompt": "Hi"}))
            .await;
        assert_eq!(status, expected, "upstream {upstream}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_generate_request_validation() {
    let app = app_with_generator(FixedReply("unused")).await;

    let (status, body) = app
        .post("/api/ai/generate", json!({"type": "tasks", "prompt": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Prompt is required");
    assert_eq!(body["error_data"][0]["field"], "prompt");

    let (status, _) = app
        .post("/api/ai/generate", json!({"type": "poem", "prompt": "Roses"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/ai/generate", json!({"prompt": "No type"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_rate_limit_returns_429() {
    let config = Config {
        rate_limit: RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
        },
        ..Config::default()
    };
    let app = TestApp::with(config, AssistService::disabled()).await;

    for _ in 0..2 {
        let (status, _) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .raw(
            axum::http::Request::builder()
                .uri("/api/boards")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=30).contains(&retry_after));

    let body = common::json_body(response).await;
    assert_eq!(body["success"], false);
}
