//! Integration tests for the HTTP layer.
//!
//! These tests spin up real servers on random ports and talk to them with
//! `MemoryClient` and raw `reqwest` calls.

mod common;

use std::sync::Arc;

use axum::{http::StatusCode, routing::post, Json, Router};
use common::{keyword_store, WrongSizeEmbedder, FAIL_MARKER};
use recall_memory::http::{create_router, ErrorResponse, HealthResponse};
use recall_memory::{Embedder, Error, MemoryClient, OpenAiEmbedder, SessionMemoryStore};
use serde_json::{json, Value};

/// Serve a router on a random port and return the base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn start_memory_server() -> String {
    let (_, store) = keyword_store();
    serve(create_router(Arc::new(store))).await
}

// ============================================================================
// Memory API
// ============================================================================

#[tokio::test]
async fn test_save_load_context_round_trip() {
    let base = start_memory_server().await;
    let client = MemoryClient::new(&base);

    assert_eq!(client.save("user123", "I like cats").await.unwrap(), 0);
    assert_eq!(client.save("user123", "I like dogs").await.unwrap(), 1);
    assert_eq!(client.save("other", "The stock market fell").await.unwrap(), 2);

    let messages = client.load("user123").await.unwrap();
    assert_eq!(messages, vec!["I like cats", "I like dogs"]);

    let context = client
        .context("user123", "tell me about pets", None)
        .await
        .unwrap();
    assert_eq!(context, vec!["I like cats", "I like dogs"]);

    let context = client
        .context("user123", "tell me about pets", Some(1))
        .await
        .unwrap();
    assert_eq!(context, vec!["I like cats"]);
}

#[tokio::test]
async fn test_load_unknown_session_is_empty() {
    let base = start_memory_server().await;
    let client = MemoryClient::new(&base);

    assert!(client.load("nobody").await.unwrap().is_empty());
    assert!(client.context("nobody", "anything", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_session_ids_with_reserved_characters() {
    let base = start_memory_server().await;
    let client = MemoryClient::new(&base);

    client.save("team/a b", "hello there").await.unwrap();
    assert_eq!(client.load("team/a b").await.unwrap(), vec!["hello there"]);
    assert!(client.load("team").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_embedding_failure_returns_bad_gateway() {
    let base = start_memory_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/save", base))
        .json(&json!({"session_id": "s1", "message": FAIL_MARKER}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "embedding_service");

    let client = MemoryClient::new(&base);
    assert!(client.load("s1").await.unwrap().is_empty());

    let err = client.save("s1", FAIL_MARKER).await.unwrap_err();
    assert!(matches!(err, Error::Remote { status: 502, .. }));
}

#[tokio::test]
async fn test_save_wrong_size_embedding_returns_bad_gateway() {
    let store = SessionMemoryStore::new(Arc::new(WrongSizeEmbedder));
    let base = serve(create_router(Arc::new(store))).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/save", base))
        .json(&json!({"session_id": "s1", "message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "embedding_dimension_mismatch");
}

#[tokio::test]
async fn test_context_with_max_top_k() {
    let base = start_memory_server().await;
    let client = MemoryClient::new(&base);

    client.save("s1", "I like cats").await.unwrap();
    client.save("s2", "The stock market fell").await.unwrap();
    client.save("s1", "I like dogs").await.unwrap();

    let context = client
        .context("s1", "tell me about pets", Some(usize::MAX))
        .await
        .unwrap();
    assert_eq!(context, vec!["I like cats", "I like dogs"]);

    let resp = reqwest::get(format!(
        "{}/context/s1?query=pets&top_k={}",
        base,
        usize::MAX
    ))
    .await
    .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn test_save_rejects_malformed_body() {
    let base = start_memory_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/save", base))
        .json(&json!({"session_id": "s1"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_context_requires_query() {
    let base = start_memory_server().await;

    let resp = reqwest::get(format!("{}/context/s1", base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn test_health_reports_counts() {
    let base = start_memory_server().await;
    let client = MemoryClient::new(&base);
    client.save("a", "one").await.unwrap();
    client.save("b", "two").await.unwrap();
    client.save("a", "three").await.unwrap();

    let health: HealthResponse = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.sessions, 2);
    assert_eq!(health.entries, 3);
    assert_eq!(health.dimensions, 4);
}

// ============================================================================
// OpenAI-compatible embedder
// ============================================================================

async fn fake_embeddings(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let input = body["input"].as_str().unwrap_or_default();
    if input == "overloaded" {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"message": "rate limited"}})),
        );
    }
    if input == "empty" {
        return (StatusCode::OK, Json(json!({"data": []})));
    }

    let len = input.len() as f32;
    (
        StatusCode::OK,
        Json(json!({
            "object": "list",
            "model": body["model"],
            "data": [{"object": "embedding", "index": 0, "embedding": [len, 1.0, 0.0]}]
        })),
    )
}

async fn start_embedding_server() -> String {
    serve(Router::new().route("/v1/embeddings", post(fake_embeddings))).await
}

#[tokio::test]
async fn test_openai_embedder_parses_vectors() {
    let base = start_embedding_server().await;
    let embedder = OpenAiEmbedder::new(base, "text-embedding-3-small", Some("sk-test".into()), 3);

    let vector = embedder.embed("hello").await.unwrap();
    assert_eq!(vector, vec![5.0, 1.0, 0.0]);
}

#[tokio::test]
async fn test_openai_embedder_surfaces_api_errors() {
    let base = start_embedding_server().await;
    let embedder = OpenAiEmbedder::new(base, "text-embedding-3-small", None, 3);

    let err = embedder.embed("overloaded").await.unwrap_err();
    match err {
        Error::EmbeddingService(msg) => assert!(msg.contains("429"), "unexpected message: {}", msg),
        other => panic!("expected embedding error, got {:?}", other),
    }

    let err = embedder.embed("empty").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingService(_)));
}

#[tokio::test]
async fn test_openai_embedder_checks_dimensions() {
    let base = start_embedding_server().await;
    let embedder = OpenAiEmbedder::new(base, "text-embedding-3-small", None, 1536);

    let err = embedder.embed("hello").await.unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: 1536,
            actual: 3
        }
    ));
}

#[tokio::test]
async fn test_unreachable_embedding_service() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let embedder = OpenAiEmbedder::new(format!("http://{}", addr), "m", None, 3);
    let err = embedder.embed("hello").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingService(_)));
}
