//! Request orchestration: validate, route, time, persist.

use crate::{CoreError, Supervisor};
use log::{debug, info, warn};
use researcher_rs_config::HistoryConfig;
use researcher_rs_protocol::{
    HistoryFilter, HistoryPage, NewQueryRecord, QueryId, QueryRecord, QueryStatistics,
};
use researcher_rs_store::QueryStore;
use std::sync::Arc;
use std::time::Instant;

/// Entry point shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct Orchestrator {
    supervisor: Supervisor,
    store: Arc<dyn QueryStore>,
    limits: HistoryConfig,
}

impl Orchestrator {
    pub fn new(supervisor: Supervisor, store: Arc<dyn QueryStore>) -> Self {
        Self {
            supervisor,
            store,
            limits: HistoryConfig::default(),
        }
    }

    /// Override the input and paging limits.
    pub fn with_limits(mut self, limits: HistoryConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &HistoryConfig {
        &self.limits
    }

    /// A history filter with the configured default page size.
    pub fn default_filter(&self) -> HistoryFilter {
        HistoryFilter::default().with_limit(self.limits.default_limit)
    }

    /// Answer `query` and persist the outcome.
    ///
    /// The trimmed query is what gets routed and stored. Routing itself never
    /// fails; only validation and storage errors are returned.
    pub async fn submit(&self, query: &str) -> Result<QueryRecord, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::Validation("query must not be empty".to_string()));
        }
        let chars = query.chars().count();
        if chars > self.limits.max_query_chars {
            return Err(CoreError::Validation(format!(
                "query must be at most {} characters (got {chars})",
                self.limits.max_query_chars
            )));
        }

        let started = Instant::now();
        let route = self.supervisor.route(query).await;
        let elapsed = started.elapsed().as_secs_f64();
        let record = self
            .store
            .insert(NewQueryRecord::from_route(route, elapsed))
            .await
            .inspect_err(|err| warn!("failed to persist query (error={err})"))?;
        info!(
            "query answered (query_id={}, agent={}, secs={:.3})",
            record.id, record.agent, record.execution_time
        );
        Ok(record)
    }

    pub async fn get(&self, id: QueryId) -> Result<Option<QueryRecord>, CoreError> {
        if id.get() == 0 {
            return Err(CoreError::Validation(
                "query_id must be a positive integer".to_string(),
            ));
        }
        Ok(self.store.get(id).await?)
    }

    /// One page of history, newest first.
    pub async fn history(&self, filter: &HistoryFilter) -> Result<HistoryPage, CoreError> {
        validate_history_filter(filter, &self.limits)?;
        debug!(
            "listing history (limit={}, offset={}, agent={:?}, search={:?})",
            filter.limit, filter.offset, filter.agent, filter.search
        );
        Ok(self.store.list(filter).await?)
    }

    pub async fn statistics(&self) -> Result<QueryStatistics, CoreError> {
        Ok(self.store.statistics().await?)
    }

    /// Delete one record; `false` when it did not exist.
    pub async fn delete(&self, id: QueryId) -> Result<bool, CoreError> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!("query deleted (query_id={id})");
        }
        Ok(removed)
    }

    /// Delete every record. Requires explicit confirmation.
    pub async fn clear(&self, confirm: bool) -> Result<u64, CoreError> {
        if !confirm {
            return Err(CoreError::Validation(
                "Set confirm=true to clear all history".to_string(),
            ));
        }
        let removed = self.store.clear().await?;
        info!("history cleared (deleted={removed})");
        Ok(removed)
    }
}

/// Check a history filter against the configured page and search limits.
pub fn validate_history_filter(
    filter: &HistoryFilter,
    limits: &HistoryConfig,
) -> Result<(), CoreError> {
    if filter.limit == 0 || filter.limit > limits.max_limit {
        return Err(CoreError::Validation(format!(
            "limit must be between 1 and {}",
            limits.max_limit
        )));
    }
    if let Some(search) = &filter.search
        && search.chars().count() > limits.max_search_chars
    {
        return Err(CoreError::Validation(format!(
            "search must be at most {} characters",
            limits.max_search_chars
        )));
    }
    Ok(())
}
