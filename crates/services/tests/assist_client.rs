//! Integration tests for the assist service against a mock
//! OpenAI-compatible server.

use std::time::Duration;

use serde_json::json;
use services::services::{
    assist::{
        AssistError, AssistService, GenerateKind, GenerateRequest, Suggestion, SuggestionSource,
    },
    config::AssistConfig,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn config_for(server: &MockServer) -> AssistConfig {
    AssistConfig {
        api_key: Some("test-key".to_string()),
        base_url: format!("{}/v1", server.uri()),
        model: "test-model".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn request(kind: GenerateKind, prompt: &str) -> GenerateRequest {
    GenerateRequest {
        kind,
        prompt: prompt.to_string(),
        context: None,
    }
}

#[tokio::test]
async fn test_structured_reply_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"tasks\": [{\"title\": \"Write docs\", \"story_points\": 2, \"priority\": \"low\"}]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let service = AssistService::new(&config_for(&server)).unwrap();
    assert!(service.is_configured());

    let response = service
        .generate(&request(GenerateKind::Tasks, "documentation"))
        .await
        .unwrap();

    assert_eq!(response.source, SuggestionSource::Model);
    let Suggestion::TaskList { tasks } = response.suggestion else {
        panic!("expected task list");
    };
    assert_eq!(tasks[0].title, "Write docs");
    assert_eq!(tasks[0].story_points, Some(2));
}

#[tokio::test]
async fn test_free_text_reply_uses_heuristics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Sure!\n1. Set up CI - run tests on every push (3 points)\n2. Add linting",
        )))
        .mount(&server)
        .await;

    let service = AssistService::new(&config_for(&server)).unwrap();
    let response = service
        .generate(&request(GenerateKind::Tasks, "tooling"))
        .await
        .unwrap();

    assert_eq!(response.source, SuggestionSource::Heuristic);
    let Suggestion::TaskList { tasks } = response.suggestion else {
        panic!("expected task list");
    };
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Set up CI");
    assert_eq!(tasks[0].story_points, Some(3));
}

#[tokio::test]
async fn test_rate_limited_upstream_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let service = AssistService::new(&config_for(&server)).unwrap();
    let response = service
        .generate(&request(GenerateKind::BoardName, "mobile app for recipes"))
        .await
        .unwrap();

    assert_eq!(response.source, SuggestionSource::Canned);
    assert!(matches!(response.suggestion, Suggestion::Board { .. }));
}

#[tokio::test]
async fn test_auth_failures_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let service = AssistService::new(&config_for(&server)).unwrap();
    let err = service
        .generate(&request(GenerateKind::Text, "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::Unauthorized));
}

#[tokio::test]
async fn test_server_error_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let service = AssistService::new(&config_for(&server)).unwrap();
    let err = service
        .generate(&request(GenerateKind::Text, "hello"))
        .await
        .unwrap_err();
    match err {
        AssistError::Upstream { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_choices_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let service = AssistService::new(&config_for(&server)).unwrap();
    let err = service
        .generate(&request(GenerateKind::Text, "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssistError::EmptyReply));
}
