/*!
 * Tests for the xAI client against a local mock server
 */

use std::time::Duration;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strans::app_config::TranslationConfig;
use strans::errors::ErrorKind;
use strans::providers::xai::XaiClient;
use strans::providers::{BatchOutcome, BatchTranslate};
use strans::translation::CancelSignal;
use crate::common::{self, TEST_API_KEY};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn client_for(server: &MockServer, timeout_secs: u64) -> XaiClient {
    let config = TranslationConfig {
        endpoint: format!("{}{}", server.uri(), COMPLETIONS_PATH),
        timeout_secs,
        ..TranslationConfig::default()
    };
    XaiClient::new(TEST_API_KEY, &config).unwrap()
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

fn texts(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
        .mount(server)
        .await;
}

/// Test that a successful response is split into aligned segments
#[tokio::test]
async fn test_translate_batch_withSuccessfulResponse_shouldReturnSegments() {
    common::init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(" bonjour \n\nmonde\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 30);
    let outcome = client
        .translate_batch(&texts(&["hello", "world"]), "French", &CancelSignal::new())
        .await;

    assert_eq!(outcome, BatchOutcome::success(texts(&["bonjour", "monde"])));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "grok-3");
    assert_eq!(body["max_tokens"], 1500);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], "Translate to French. Only translation, no explanations.");
    assert_eq!(messages[1], json!({ "role": "user", "content": "hello" }));
    assert_eq!(messages[2], json!({ "role": "user", "content": "world" }));
}

/// Test that a short response is padded to the requested count
#[tokio::test]
async fn test_translate_batch_withShortResponse_shouldPadWithEmptySegments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("uno")))
        .mount(&server)
        .await;

    let outcome = client_for(&server, 30)
        .translate_batch(&texts(&["one", "two", "three"]), "Spanish", &CancelSignal::new())
        .await;

    assert_eq!(outcome.texts, Some(texts(&["uno", "", ""])));
}

/// Test that HTTP status codes map to the documented error kinds
#[tokio::test]
async fn test_translate_batch_withErrorStatuses_shouldClassifyKinds() {
    for (status, expected) in [(401, ErrorKind::Auth), (429, ErrorKind::RateLimit), (402, ErrorKind::Quota)] {
        let server = MockServer::start().await;
        mount_status(&server, status).await;

        let outcome = client_for(&server, 30)
            .translate_batch(&texts(&["hello"]), "French", &CancelSignal::new())
            .await;

        assert_eq!(outcome, BatchOutcome::failure(expected), "status {}", status);
    }
}

/// Test that other failures become a truncated network error
#[tokio::test]
async fn test_translate_batch_withServerError_shouldReturnNetworkKind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(500)))
        .mount(&server)
        .await;

    let outcome = client_for(&server, 30)
        .translate_batch(&texts(&["hello"]), "French", &CancelSignal::new())
        .await;

    match outcome.error {
        Some(ErrorKind::Network(message)) => {
            assert!(message.starts_with("500"));
            assert!(message.chars().count() <= 80);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(outcome.texts.is_none());
}

/// Test that an undecodable body is reported, not panicked on
#[tokio::test]
async fn test_translate_batch_withMalformedBody_shouldReturnNetworkKind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let outcome = client_for(&server, 30)
        .translate_batch(&texts(&["hello"]), "French", &CancelSignal::new())
        .await;

    assert!(matches!(outcome.error, Some(ErrorKind::Network(_))));
}

/// Test that a slow server trips the request timeout
#[tokio::test]
async fn test_translate_batch_withSlowServer_shouldReturnTimeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let outcome = client_for(&server, 1)
        .translate_batch(&texts(&["hello"]), "French", &CancelSignal::new())
        .await;

    assert_eq!(outcome, BatchOutcome::failure(ErrorKind::Timeout));
}

/// Test that a cancel raised during the call wins over its result
#[tokio::test]
async fn test_translate_batch_withCancelDuringCall_shouldReturnCanceled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("bonjour"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 30);
    let cancel = CancelSignal::new();
    let canceler = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceler.cancel();
    });

    let outcome = client.translate_batch(&texts(&["hello"]), "French", &cancel).await;

    assert_eq!(outcome, BatchOutcome::failure(ErrorKind::Canceled));
}
