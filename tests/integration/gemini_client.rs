//! Integration tests for the Gemini client against a local mock server

use genfleet::config::ProviderSettings;
use genfleet::error::ApiError;
use genfleet::provider::{GeminiClient, GenerationClient, GenerationRequest, SamplingConfig};
use genfleet::variant::from_models;
use genfleet::{BatchSummary, Concurrency, Task, TaskScheduler};
use serde_json::json;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        endpoint: server.uri(),
        timeout_secs: 5,
        ..ProviderSettings::default()
    }
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_generate_sends_sampling_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "temperature": 0.2, "topK": 40 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("export const A = 1;")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key".to_string(), &settings(&server)).unwrap();
    let request = GenerationRequest::new("gemini-test", "write A", SamplingConfig::strict());

    let text = client.generate(&request).await.unwrap();
    assert_eq!(text, "export const A = 1;");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn test_connect_error_does_not_expose_key() {
    // Bind then release a port so the connection is refused
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let settings = ProviderSettings {
        endpoint: format!("http://{addr}"),
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..ProviderSettings::default()
    };

    let client = GeminiClient::new("SECRET-KEY-1234".to_string(), &settings).unwrap();
    let error = client
        .generate(&GenerationRequest::new("m", "p", SamplingConfig::default()))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::ProviderRequestFailed(_)), "{error:?}");
    assert!(!error.to_string().contains("SECRET-KEY-1234"), "{error}");
    assert!(!format!("{error:?}").contains("SECRET-KEY-1234"));
}

#[tokio::test]
async fn test_timeout_fails_only_its_own_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("write slow.ts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("const fast = 1;")))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let tasks: Vec<Task> = ["a.ts", "slow.ts", "c.ts"]
        .iter()
        .map(|name| Task::new(*name, temp.path().join(name), format!("write {name}")))
        .collect();

    let settings = ProviderSettings {
        timeout_secs: 1,
        ..settings(&server)
    };
    let client = Arc::new(GeminiClient::new("SECRET-KEY-1234".to_string(), &settings).unwrap());
    let results = TaskScheduler::new(client, "gemini-test", Concurrency::resolve(3))
        .run_single(tasks.clone())
        .await;

    assert!(results[0].outcome.is_ok());
    assert!(results[2].outcome.is_ok());
    let error = results[1].outcome.as_ref().unwrap_err();
    assert!(error.contains("Request timeout"), "{error}");
    assert!(!error.contains("SECRET-KEY-1234"));
    assert!(!tasks[1].output_path.exists());
    assert_eq!(
        BatchSummary::from_results(&results),
        BatchSummary {
            succeeded: 2,
            failed: 1,
            total: 3,
        }
    );
}

#[tokio::test]
async fn test_timeout_fails_only_its_own_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/slow:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/fast:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("const fast = 1;")))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let task = Task::new("card.tsx", temp.path().join("card.tsx"), "write a card");
    let settings = ProviderSettings {
        timeout_secs: 1,
        ..settings(&server)
    };
    let client = Arc::new(GeminiClient::new("k".to_string(), &settings).unwrap());
    let results = TaskScheduler::new(client, "fast", Concurrency::resolve(1))
        .run_competition(vec![task.clone()], from_models(&["slow", "fast"]))
        .await;

    let result = &results[0];
    assert!(result.outcomes[0].error().unwrap().contains("Request timeout"));
    assert!(result.outcomes[0].score.is_none());
    assert_eq!(result.outcomes[1].content(), Some("const fast = 1;"));
    assert_eq!(result.best, Some(1));
    assert_eq!(std::fs::read_to_string(&task.output_path).unwrap(), "const fast = 1;");
    assert_eq!(BatchSummary::from_results(&results).succeeded, 1);
}

#[tokio::test]
async fn test_prompt_carries_preamble() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k".to_string(), &settings(&server)).unwrap();
    client
        .generate(&GenerationRequest::new("m", "write a form", SamplingConfig::default()))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.starts_with("You are an expert programmer."));
    assert!(prompt.ends_with("write a form"));
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/missing:generateContent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "models/missing is not found" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/busy:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/locked:generateContent"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k".to_string(), &settings(&server)).unwrap();
    let call = |model: &'static str| GenerationRequest::new(model, "p", SamplingConfig::default());

    match client.generate(&call("missing")).await {
        Err(ApiError::ProviderModelNotFound(msg)) => assert!(msg.contains("is not found")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        client.generate(&call("busy")).await,
        Err(ApiError::ProviderRateLimit(_))
    ));
    assert!(matches!(
        client.generate(&call("locked")).await,
        Err(ApiError::ProviderAuthFailed(_))
    ));
}

#[tokio::test]
async fn test_empty_candidates_is_generation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k".to_string(), &settings(&server)).unwrap();
    let result = client
        .generate(&GenerationRequest::new("m", "p", SamplingConfig::default()))
        .await;

    assert!(matches!(result, Err(ApiError::GenerationFailed(_))));
}

#[tokio::test]
async fn test_batch_over_http_writes_each_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("const done = true;")))
        .expect(3)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let tasks: Vec<Task> = ["a.ts", "b.ts", "c.ts"]
        .iter()
        .map(|name| Task::new(*name, temp.path().join("gen").join(name), format!("write {name}")))
        .collect();

    let client = Arc::new(GeminiClient::new("k".to_string(), &settings(&server)).unwrap());
    let results = TaskScheduler::new(client, "gemini-test", Concurrency::resolve(2))
        .run_single(tasks.clone())
        .await;

    for (task, result) in tasks.iter().zip(&results) {
        assert!(result.outcome.is_ok(), "{:?}", result.outcome);
        assert_eq!(std::fs::read_to_string(&task.output_path).unwrap(), "const done = true;");
    }
}
