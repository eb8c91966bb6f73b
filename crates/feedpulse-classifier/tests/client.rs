//! Integration tests for `ClassifierClient` using wiremock HTTP mocks.

use feedpulse_classifier::{ClassifierClient, ClassifierError, MAX_ATTEMPTS};
use feedpulse_core::Topic;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ClassifierClient {
    ClassifierClient::with_base_url("test-key", base_url)
        .expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "cmpl-42",
        "object": "chat.completion",
        "model": "mistral-large-latest",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138 }
    })
}

#[tokio::test]
async fn classify_returns_parsed_classification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "mistral-large-latest",
            "random_seed": 42_069,
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"topic": "Performance", "sentiment_score": -0.7}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let c = client
        .classify("The dashboard takes forever to load")
        .await
        .expect("should classify");

    assert_eq!(c.topic, Topic::Performance);
    assert!((c.sentiment_score + 0.7).abs() < f64::EPSILON);
}

#[tokio::test]
async fn persistent_server_error_exhausts_all_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(u64::from(MAX_ATTEMPTS))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.classify("anything").await.unwrap_err();

    assert!(
        matches!(err, ClassifierError::Unavailable { attempts: 5, .. }),
        "expected Unavailable after 5 attempts, got {err:?}"
    );
}

#[tokio::test]
async fn transient_failures_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"topic": "Support client", "sentiment_score": 0.4}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let c = client.classify("Support answered quickly").await.unwrap();
    assert_eq!(c.topic, Topic::CustomerSupport);
}

#[tokio::test]
async fn malformed_success_body_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.classify("text").await.unwrap_err();
    assert!(matches!(err, ClassifierError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn unknown_topic_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"topic": "Météo", "sentiment_score": 0.0}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.classify("It rained").await.unwrap_err();
    assert!(matches!(err, ClassifierError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn out_of_range_score_is_returned_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"topic": "Documentation", "sentiment_score": 2.5}"#,
        )))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let c = client.classify("docs").await.unwrap();
    assert!(!c.score_in_bounds());
}

#[tokio::test]
async fn unreachable_server_reports_unavailable() {
    // Port 1 is never listening.
    let client = test_client("http://127.0.0.1:1");
    let err = client.classify("hello").await.unwrap_err();
    assert!(
        matches!(err, ClassifierError::Unavailable { attempts: 5, .. }),
        "got {err:?}"
    );
}
