//! Indexer HTTP integration tests
//!
//! Pins the wire contract the agent depends on: the `docs` response key, the
//! top-level field layout, and raw preservation.

use std::sync::Arc;

use observix_indexer::api;
use observix_indexer::profiles::ProfileRegistry;

async fn spawn_indexer(max_request_bytes: usize) -> String {
    let app = api::create_router(Arc::new(ProfileRegistry::builtin()), max_request_bytes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn healthz_reports_ok() {
    let base = spawn_indexer(1_048_576).await;
    let response = reqwest::get(format!("{}/healthz", base)).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn normalize_contract_docs_key_and_raw_preserved() {
    let base = spawn_indexer(1_048_576).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/normalize", base))
        .json(&serde_json::json!({
            "profile": "json_auto",
            "raw": [r#"{"k":1}"#, "plain line"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let docs = body["docs"].as_array().expect("response key must be docs");
    assert_eq!(docs.len(), 2);

    // JSON line: extracted field at the top level, original line under raw.
    assert_eq!(docs[0]["k"], 1);
    assert_eq!(docs[0]["raw"], r#"{"k":1}"#);

    // Non-JSON line: unchanged.
    assert_eq!(docs[1]["raw"], "plain line");
    assert_eq!(docs[1].as_object().unwrap().len(), 1);

    // Every document carries a non-empty raw.
    for doc in docs {
        assert!(!doc["raw"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn single_string_is_split_on_newlines() {
    let base = spawn_indexer(1_048_576).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/normalize", base))
        .json(&serde_json::json!({
            "profile": "passthrough",
            "raw": "a\nb\n\nc\n"
        }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    let docs = body["docs"].as_array().unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0]["raw"], "a");
    assert_eq!(docs[1]["raw"], "b");
    assert_eq!(docs[2]["raw"], "c");
}

#[tokio::test]
async fn kv_pairs_profile_extracts_tokens() {
    let base = spawn_indexer(1_048_576).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/normalize", base))
        .json(&serde_json::json!({
            "profile": "kv_pairs",
            "raw": "level=warn code=502"
        }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["docs"][0]["level"], "warn");
    assert_eq!(body["docs"][0]["code"], "502");
    assert_eq!(body["docs"][0]["raw"], "level=warn code=502");
}

#[tokio::test]
async fn unknown_profile_returns_400() {
    let base = spawn_indexer(1_048_576).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/normalize", base))
        .json(&serde_json::json!({"profile": "nope", "raw": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unknown_profile");
}

#[tokio::test]
async fn oversized_request_returns_413() {
    let base = spawn_indexer(1024).await;

    let big_line = "x".repeat(4096);
    let response = reqwest::Client::new()
        .post(format!("{}/v1/normalize", base))
        .json(&serde_json::json!({"profile": "passthrough", "raw": big_line}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
}
