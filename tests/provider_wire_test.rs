// Wire-level tests for both provider schemas against a mock HTTP server.

use helio::config::ProviderKind;
use helio::provider::{
    ChatRole, ChatTurn, CompletionProvider, GeminiProvider, OpenAiProvider, ProviderError,
    ProviderSettings,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(kind: ProviderKind, endpoint: String) -> ProviderSettings {
    ProviderSettings {
        kind,
        endpoint,
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        system_prompt: "You are Dr. Helio.".to_string(),
    }
}

fn history() -> Vec<ChatTurn> {
    vec![
        ChatTurn::new(ChatRole::User, "I have a headache"),
        ChatTurn::new(ChatRole::Assistant, "Tell me more."),
    ]
}

#[tokio::test]
async fn test_gemini_success_and_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/generate"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  Rest and hydrate.  " }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(
        ProviderKind::Gemini,
        format!("{}/v1beta/generate", server.uri()),
    ));
    let reply = provider.complete(&history(), "It is getting worse").await.unwrap();
    assert_eq!(reply, "Rest and hydrate.");

    // Inspect the captured request body: user/model role mapping, system
    // prompt folded into the first user part, new message last.
    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[2]["role"], "user");
    let first_text = contents[0]["parts"][0]["text"].as_str().unwrap();
    assert!(first_text.starts_with("You are Dr. Helio."));
    assert!(first_text.ends_with("User message: I have a headache"));
    assert_eq!(contents[2]["parts"][0]["text"], "It is getting worse");
}

#[tokio::test]
async fn test_openai_success_and_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": "Rest and hydrate." }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(settings(
        ProviderKind::OpenAi,
        format!("{}/v1/chat/completions", server.uri()),
    ));
    let reply = provider.complete(&history(), "It is getting worse").await.unwrap();
    assert_eq!(reply, "Rest and hydrate.");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "test-model");
    let messages = body["messages"].as_array().unwrap();
    let roles: Vec<&str> =
        messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    assert_eq!(messages[0]["content"], "You are Dr. Helio.");
    assert_eq!(messages[3]["content"], "It is getting worse");
}

#[tokio::test]
async fn test_non_success_status_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string("{\"error\": \"quota exceeded\"}"),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(ProviderKind::Gemini, server.uri()));
    let err = provider.complete(&[], "hello").await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(settings(ProviderKind::OpenAi, server.uri()));
    let err = provider.complete(&[], "hello").await.unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_empty_candidates_maps_to_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(ProviderKind::Gemini, server.uri()));
    let err = provider.complete(&[], "hello").await.unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_maps_to_transport_error() {
    // Port 1 is never listening.
    let provider = GeminiProvider::new(settings(
        ProviderKind::Gemini,
        "http://127.0.0.1:1/generate".to_string(),
    ));
    let err = provider.complete(&[], "hello").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}
