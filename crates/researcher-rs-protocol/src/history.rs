//! History listing and statistics shapes.

use crate::QueryRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of records returned per history page.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Largest page size a history listing will return.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Filter and window for a history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    /// Exact agent display name.
    #[serde(default)]
    pub agent: Option<String>,
    /// Case-insensitive substring matched against the query text.
    #[serde(default)]
    pub search: Option<String>,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            offset: 0,
            agent: None,
            search: None,
        }
    }
}

impl HistoryFilter {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Limit clamped into `1..=MAX_HISTORY_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_HISTORY_LIMIT)
    }

    /// Search term with surrounding whitespace removed; empty terms are ignored.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// One window of a history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<QueryRecord>,
    /// Count of all matching records, ignoring the window.
    pub total: u64,
}

/// Aggregate view over every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStatistics {
    pub total_queries: u64,
    pub queries_by_agent: BTreeMap<String, u64>,
    /// Mean execution time in seconds, rounded to three decimals.
    pub avg_execution_time: f64,
    pub last_query_time: Option<DateTime<Utc>>,
}

impl QueryStatistics {
    pub fn empty() -> Self {
        Self {
            total_queries: 0,
            queries_by_agent: BTreeMap::new(),
            avg_execution_time: 0.0,
            last_query_time: None,
        }
    }
}
