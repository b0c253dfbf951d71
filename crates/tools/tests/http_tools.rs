//! Integration tests for the HTTP tools.
//!
//! Each test serves a fake API on a random local port, the same way the
//! profile and search providers would answer.

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::{Value, json};
use starter_tools::{
    PROFILE_ERROR_PREFIX, PROFILE_NOT_CONFIGURED, ProfileConfig, ProfileLookup,
    ProfileLookupClient, SEARCH_ERROR_PREFIX, SearchConfig, ToolOutput, WebSearch,
    WebSearchClient,
};
use std::collections::HashMap;
use std::time::Duration;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Accepts connections and never answers.
async fn serve_silent() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

async fn fake_profile(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-key");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    if params.get("url").map(String::as_str) != Some("https://example.com/in/jdoe") {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no such profile"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "full_name": "Jane Doe",
            "headline": "CTO at Acme",
            "experiences": [
                {"title": "CTO", "company": "Acme", "starts_at": {"year": 2021, "month": 6}, "ends_at": null}
            ],
            "education": null,
            "skills": ["Rust"]
        })),
    )
}

fn profile_client(base: &str, key: Option<&str>, timeout_ms: u64) -> ProfileLookupClient {
    ProfileLookupClient::new(ProfileConfig {
        api_url: format!("{base}/proxycurl/api/v2/linkedin"),
        api_key: key.map(str::to_string),
        timeout_ms,
    })
    .unwrap()
}

// ============================================================================
// Profile lookup
// ============================================================================

#[tokio::test]
async fn profile_lookup_formats_response() {
    let base = serve(Router::new().route("/proxycurl/api/v2/linkedin", get(fake_profile))).await;
    let client = profile_client(&base, Some("test-key"), 5_000);

    let out = client.lookup("https://example.com/in/jdoe").await;

    let ToolOutput::Data(text) = out else {
        panic!("expected data, got {out:?}");
    };
    assert!(text.contains("Name: Jane Doe"));
    assert!(text.contains("- CTO at Acme (2021-06 to Present)"));
    assert!(text.contains("## Skills\nRust"));
    assert!(!text.contains("## Education"));
}

#[tokio::test]
async fn profile_lookup_reports_error_status() {
    let base = serve(Router::new().route("/proxycurl/api/v2/linkedin", get(fake_profile))).await;
    let client = profile_client(&base, Some("wrong-key"), 5_000);

    let out = client.lookup("https://example.com/in/jdoe").await;

    assert!(matches!(out, ToolOutput::Unavailable(_)));
    assert!(out.text().starts_with(PROFILE_ERROR_PREFIX));
    assert!(out.text().contains("401"));
}

#[tokio::test]
async fn profile_lookup_timeout_is_distinguishable() {
    let base = serve_silent().await;
    let client = profile_client(&base, Some("test-key"), 200);

    let out = tokio::time::timeout(
        Duration::from_secs(5),
        client.lookup("https://example.com/in/jdoe"),
    )
    .await
    .expect("lookup must honor its own timeout");

    assert!(matches!(out, ToolOutput::Unavailable(_)));
    assert!(!out.text().is_empty());
    assert_ne!(out.text(), PROFILE_NOT_CONFIGURED);
    assert!(out.text().starts_with(PROFILE_ERROR_PREFIX));
}

#[tokio::test]
async fn profile_lookup_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = profile_client(&base, Some("test-key"), 2_000);
    let out = client.lookup("https://example.com/in/jdoe").await;

    assert!(out.text().starts_with(PROFILE_ERROR_PREFIX));
}

#[tokio::test]
async fn profile_lookup_malformed_json() {
    let router = Router::new().route(
        "/proxycurl/api/v2/linkedin",
        get(|| async { "definitely not json" }),
    );
    let base = serve(router).await;
    let client = profile_client(&base, Some("test-key"), 5_000);

    let out = client.lookup("https://example.com/in/jdoe").await;

    assert!(out.text().starts_with(PROFILE_ERROR_PREFIX));
    assert!(out.text().contains("malformed"));
}

// ============================================================================
// Web search
// ============================================================================

async fn fake_search(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer fc-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"success": false})));
    }
    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("nobody") {
        return (StatusCode::OK, Json(json!({"success": true, "data": []})));
    }
    assert_eq!(body["limit"], 3);
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": [
                {"url": "https://acme.example/team", "title": "Acme team", "description": "Jane Doe, CTO"},
                {"url": "https://conf.example/talks/42", "title": "Scaling Rust", "description": null}
            ]
        })),
    )
}

fn search_client(base: &str, key: &str) -> WebSearchClient {
    WebSearchClient::new(SearchConfig {
        api_url: format!("{base}/v1/search"),
        api_key: Some(key.to_string()),
        limit: 3,
        timeout_ms: 5_000,
    })
    .unwrap()
}

#[tokio::test]
async fn search_renders_hits_with_sources() {
    let base = serve(Router::new().route("/v1/search", post(fake_search))).await;
    let out = search_client(&base, "fc-key").search("\"Jane Doe\" Acme").await;

    assert!(out.is_data());
    assert!(out.text().contains("### Acme team\nSource: https://acme.example/team\nJane Doe, CTO"));
    assert!(out.text().contains("Source: https://conf.example/talks/42"));
}

#[tokio::test]
async fn search_with_no_hits_is_data_not_error() {
    let base = serve(Router::new().route("/v1/search", post(fake_search))).await;
    let out = search_client(&base, "fc-key").search("nobody at all").await;

    assert!(out.is_data());
    assert!(out.text().starts_with("No web results found"));
}

#[tokio::test]
async fn search_error_status_is_reported() {
    let base = serve(Router::new().route("/v1/search", post(fake_search))).await;
    let out = search_client(&base, "wrong").search("q").await;

    assert!(matches!(out, ToolOutput::Unavailable(_)));
    assert!(out.text().starts_with(SEARCH_ERROR_PREFIX));
}
