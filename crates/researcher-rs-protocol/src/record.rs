//! Query records and routing results.

use crate::AgentName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Short numeric identifier assigned to a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(pub u32);

impl QueryId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QueryId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Outcome of routing a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Agent that produced the response.
    pub agent: AgentName,
    /// Generated response text.
    pub response: String,
    /// Query exactly as received.
    pub query: String,
}

/// Fields supplied by the caller when persisting a record.
///
/// The identifier and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQueryRecord {
    pub query: String,
    pub agent: AgentName,
    pub response: String,
    /// Wall-clock seconds spent producing the response.
    pub execution_time: f64,
    #[serde(default)]
    pub adjustments: Vec<Value>,
}

impl NewQueryRecord {
    /// Build a record from a routing result and its measured duration.
    pub fn from_route(route: RouteResult, execution_time: f64) -> Self {
        Self {
            query: route.query,
            agent: route.agent,
            response: route.response,
            execution_time: execution_time.max(0.0),
            adjustments: Vec::new(),
        }
    }
}

/// A persisted query/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(rename = "query_id")]
    pub id: QueryId,
    pub query: String,
    pub agent: AgentName,
    pub response: String,
    pub execution_time: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub adjustments: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn record_exposes_query_id_on_the_wire() {
        let record = QueryRecord {
            id: QueryId(417),
            query: "latest ai news".to_string(),
            agent: AgentName::News,
            response: "summary".to_string(),
            execution_time: 1.25,
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp"),
            adjustments: Vec::new(),
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["query_id"], json!(417));
        assert_eq!(value["agent"], json!("News Agent"));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn new_record_clamps_negative_durations() {
        let route = RouteResult {
            agent: AgentName::GeneralAssistant,
            response: "hi".to_string(),
            query: "hello".to_string(),
        };
        let record = NewQueryRecord::from_route(route, -0.5);
        assert_eq!(record.execution_time, 0.0);
        assert_eq!(record.agent, AgentName::GeneralAssistant);
    }
}
