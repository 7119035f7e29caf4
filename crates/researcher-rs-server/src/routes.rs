//! HTTP handlers.

use crate::ApiError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, Uri};
use researcher_rs_core::Orchestrator;
use researcher_rs_protocol::{HistoryFilter, QueryId, QueryRecord, QueryStatistics};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const SERVICE_NAME: &str = "researcher";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub agent: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearParams {
    pub confirm: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<QueryRecord>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub query_id: QueryId,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub deleted_count: u64,
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "query": "POST /api/v1/query",
            "get_query": "GET /api/v1/query/{query_id}",
            "history": "GET /api/v1/history?limit&offset&agent&search",
            "statistics": "GET /api/v1/history/stats",
            "delete_query": "DELETE /api/v1/history/{query_id}",
            "clear_history": "DELETE /api/v1/history?confirm=true",
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

pub async fn submit_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryRecord>, ApiError> {
    let Json(request) = body.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let record = state.orchestrator.submit(&request.query).await?;
    Ok(Json(record))
}

pub async fn get_query(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<QueryRecord>, ApiError> {
    let id = parse_id(id)?;
    state
        .orchestrator
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Query {id} not found")))
}

pub async fn list_history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let filter = history_filter(&state.orchestrator, params)?;
    let page = state.orchestrator.history(&filter).await?;
    Ok(Json(HistoryResponse {
        items: page.items,
        total: page.total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

pub async fn history_statistics(
    State(state): State<AppState>,
) -> Result<Json<QueryStatistics>, ApiError> {
    Ok(Json(state.orchestrator.statistics().await?))
}

pub async fn delete_query(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(id)?;
    if !state.orchestrator.delete(id).await? {
        return Err(ApiError::not_found(format!("Query {id} not found")));
    }
    Ok(Json(DeleteResponse {
        message: format!("Query {id} deleted successfully"),
        query_id: id,
    }))
}

pub async fn clear_history(
    State(state): State<AppState>,
    params: Result<Query<ClearParams>, QueryRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let deleted_count = state
        .orchestrator
        .clear(params.confirm.unwrap_or(false))
        .await?;
    Ok(Json(ClearResponse {
        message: format!("Cleared {deleted_count} queries from history"),
        deleted_count,
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("No route matches this path")
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(format!("{method} is not supported on {}", uri.path()))
}

fn parse_id(id: Result<Path<i64>, PathRejection>) -> Result<QueryId, ApiError> {
    let Path(raw) = id.map_err(|err| ApiError::bad_request(err.body_text()))?;
    u32::try_from(raw)
        .ok()
        .filter(|id| *id > 0)
        .map(QueryId)
        .ok_or_else(|| ApiError::bad_request("query_id must be a positive integer"))
}

fn history_filter(
    orchestrator: &Orchestrator,
    params: HistoryParams,
) -> Result<HistoryFilter, ApiError> {
    let mut filter = orchestrator.default_filter();
    if let Some(limit) = params.limit {
        filter.limit = usize::try_from(limit).map_err(|_| {
            ApiError::bad_request(format!(
                "limit must be between 1 and {}",
                orchestrator.limits().max_limit
            ))
        })?;
    }
    if let Some(offset) = params.offset {
        filter.offset = usize::try_from(offset)
            .map_err(|_| ApiError::bad_request("offset must be zero or positive"))?;
    }
    filter.agent = params.agent.filter(|agent| !agent.trim().is_empty());
    filter.search = params.search.filter(|search| !search.trim().is_empty());
    Ok(filter)
}
