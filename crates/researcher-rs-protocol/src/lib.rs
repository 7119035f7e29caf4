//! Shared domain types for the researcher workspace.
//!
//! Agent names, routing domains, persisted query records and the history
//! filter/statistics shapes used by the store, core and server crates.

mod agent;
mod history;
mod record;

pub use agent::{AgentName, Domain, UnknownAgentName};
pub use history::{
    DEFAULT_HISTORY_LIMIT, HistoryFilter, HistoryPage, MAX_HISTORY_LIMIT, QueryStatistics,
};
pub use record::{NewQueryRecord, QueryId, QueryRecord, RouteResult};
