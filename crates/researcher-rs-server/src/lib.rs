//! HTTP surface for the query router.

pub mod error;
pub mod routes;

pub use error::{ApiError, ErrorBody, ServerError};
pub use routes::AppState;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use log::info;
use researcher_rs_config::ServerConfig;
use researcher_rs_core::Orchestrator;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router around `orchestrator`.
pub fn build_router(orchestrator: Orchestrator) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/v1/query", post(routes::submit_query))
        .route("/api/v1/query/{query_id}", get(routes::get_query))
        .route(
            "/api/v1/history",
            get(routes::list_history).delete(routes::clear_history),
        )
        .route("/api/v1/history/stats", get(routes::history_statistics))
        .route(
            "/api/v1/history/{query_id}",
            axum::routing::delete(routes::delete_query),
        )
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .with_state(AppState { orchestrator })
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
}

/// Bind `config.host:config.port` and serve until Ctrl-C.
pub async fn serve(orchestrator: Orchestrator, config: &ServerConfig) -> Result<(), ServerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("server listening (addr={addr})");
    axum::serve(listener, build_router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;
    info!("server stopped");
    Ok(())
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "request handled (method={method}, path={path}, status={}, elapsed_ms={})",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
