use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use researcher_rs_core::{
    ChatModel, GeneralResponder, MarketResponder, NewsResponder, Orchestrator, Responders,
    StockResponder, Supervisor,
};
use researcher_rs_server::build_router;
use researcher_rs_store::SqliteQueryStore;
use researcher_rs_test_utils::{
    FixedLLM, StubNewsSource, StubProductSource, StubStockSource, sample_articles,
    sample_products, sample_quote,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const BODY_LIMIT: usize = 1_048_576;

/// Router whose model always answers `reply`, so every query routes to that domain.
fn app(reply: &str) -> Router {
    let llm = ChatModel::new(Arc::new(FixedLLM::new(reply)));
    let responders = Responders {
        news: Arc::new(NewsResponder::new(
            Arc::new(StubNewsSource::with_articles(sample_articles(3))),
            llm.clone(),
        )),
        market: Arc::new(MarketResponder::new(
            Arc::new(StubProductSource::with_products(sample_products(2))),
            llm.clone(),
        )),
        stock: Arc::new(StockResponder::new(
            Arc::new(StubStockSource::with_quote(sample_quote("AAPL"))),
            llm.clone(),
            "AAPL",
        )),
        general: Arc::new(GeneralResponder::new(llm.clone())),
    };
    let store = SqliteQueryStore::in_memory().expect("store");
    build_router(Orchestrator::new(
        Supervisor::new(llm, responders),
        Arc::new(store),
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).expect("build request"))
        .await
        .expect("router call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse json")
    };
    (status, json)
}

async fn submit(app: &Router, query: &str) -> Value {
    let (status, body) = send(app, "POST", "/api/v1/query", Some(json!({ "query": query }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn health_and_banner() {
    let app = app("general");
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "service": "researcher" }));

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["query"], "POST /api/v1/query");
}

#[tokio::test]
async fn submit_returns_the_persisted_record() {
    let app = app("news");
    let record = submit(&app, "What's the latest news on AI?").await;
    assert_eq!(record["agent"], "News Agent");
    assert_eq!(record["query"], "What's the latest news on AI?");
    let id = record["query_id"].as_u64().expect("numeric id");
    assert!((100..=999).contains(&id));
    assert!(record["response"].as_str().unwrap_or_default().contains("Headline 1"));

    let (status, fetched) = send(&app, "GET", &format!("/api/v1/query/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, record);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let app = app("general");
    let (status, body) = send(&app, "POST", "/api/v1/query", Some(json!({ "query": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error");
    assert!(body["timestamp"].is_string());

    let (status, _) = send(&app, "POST", "/api/v1/query", Some(json!({ "text": "hi" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_invalid_ids() {
    let app = app("general");
    let (status, body) = send(&app, "GET", "/api/v1/query/123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Query 123 not found");

    let (status, _) = send(&app, "GET", "/api/v1/query/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/api/v1/query/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_filters_and_windows() {
    let app = app("market");
    for query in ["cheap laptop", "laptop stand", "office chair"] {
        submit(&app, query).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["items"][0]["query"], "office chair");

    let (_, body) = send(&app, "GET", "/api/v1/history?search=LAPTOP&limit=1", None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(&app, "GET", "/api/v1/history?agent=News%20Agent", None).await;
    assert_eq!(body["total"], 0);

    for bad in ["limit=0", "limit=501", "limit=-1", "offset=-5", "limit=abc"] {
        let (status, _) = send(&app, "GET", &format!("/api/v1/history?{bad}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
    }
}

#[tokio::test]
async fn statistics_summarize_history() {
    let app = app("stock");
    submit(&app, "AAPL stock price").await;
    submit(&app, "TSLA outlook").await;

    let (status, stats) = send(&app, "GET", "/api/v1/history/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_queries"], 2);
    assert_eq!(stats["queries_by_agent"]["Stock Analyst"], 2);
    assert!(stats["last_query_time"].is_string());
}

#[tokio::test]
async fn delete_then_clear() {
    let app = app("general");
    let first = submit(&app, "what is rust").await;
    submit(&app, "what is tokio").await;
    let id = first["query_id"].as_u64().expect("id");

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/history/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query_id"], id);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/history/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/api/v1/history", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Set confirm=true to clear all history");

    let (status, body) = send(&app, "DELETE", "/api/v1/history?confirm=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 1);
}

#[tokio::test]
async fn unknown_routes_are_json_404s() {
    let app = app("general");
    let (status, body) = send(&app, "GET", "/api/v2/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn unsupported_methods_get_json_405s() {
    let app = app("general");
    let (status, body) = send(&app, "GET", "/api/v1/history/123", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
    assert_eq!(body["detail"], "GET is not supported on /api/v1/history/123");

    let (status, body) = send(&app, "PUT", "/api/v1/query", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["timestamp"].is_string());
}
