//! Agent names and routing domains.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display name of the responder that produced a record.
///
/// Serialized as the human-readable name (`"News Agent"`, ...), which is also
/// the value persisted by the store and matched by history filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentName {
    #[serde(rename = "News Agent")]
    News,
    #[serde(rename = "Market Research Agent")]
    MarketResearch,
    #[serde(rename = "Stock Analyst")]
    StockAnalyst,
    #[serde(rename = "General Assistant")]
    GeneralAssistant,
    /// Reserved for routing runs that failed internally.
    #[serde(rename = "Error")]
    Error,
}

impl AgentName {
    /// Every agent name, including the reserved error name.
    pub const ALL: [AgentName; 5] = [
        AgentName::News,
        AgentName::MarketResearch,
        AgentName::StockAnalyst,
        AgentName::GeneralAssistant,
        AgentName::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::News => "News Agent",
            AgentName::MarketResearch => "Market Research Agent",
            AgentName::StockAnalyst => "Stock Analyst",
            AgentName::GeneralAssistant => "General Assistant",
            AgentName::Error => "Error",
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown agent name: {0}")]
pub struct UnknownAgentName(pub String);

impl FromStr for AgentName {
    type Err = UnknownAgentName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AgentName::ALL
            .into_iter()
            .find(|agent| agent.as_str() == value)
            .ok_or_else(|| UnknownAgentName(value.to_string()))
    }
}

/// Closed set of routing domains a query can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    News,
    Market,
    Stock,
    General,
}

impl Domain {
    /// Domains in routing priority order.
    pub const PRIORITY: [Domain; 4] = [Domain::News, Domain::Market, Domain::Stock, Domain::General];

    /// Lowercase label used in classification prompts and replies.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::News => "news",
            Domain::Market => "market",
            Domain::Stock => "stock",
            Domain::General => "general",
        }
    }

    /// Agent that answers queries routed to this domain.
    pub fn agent(&self) -> AgentName {
        match self {
            Domain::News => AgentName::News,
            Domain::Market => AgentName::MarketResearch,
            Domain::Stock => AgentName::StockAnalyst,
            Domain::General => AgentName::GeneralAssistant,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn agent_names_round_trip_through_display() {
        for agent in AgentName::ALL {
            assert_eq!(agent.to_string().parse::<AgentName>(), Ok(agent));
        }
    }

    #[test]
    fn agent_name_serializes_as_display_name() {
        let json = serde_json::to_string(&AgentName::MarketResearch).expect("serialize");
        assert_eq!(json, "\"Market Research Agent\"");
    }

    #[test]
    fn unknown_agent_name_is_rejected() {
        let err = "Weather Agent".parse::<AgentName>().unwrap_err();
        assert_eq!(err, UnknownAgentName("Weather Agent".to_string()));
    }

    #[test]
    fn every_domain_maps_to_a_non_error_agent() {
        for domain in Domain::PRIORITY {
            assert!(domain.agent() != AgentName::Error);
        }
        assert_eq!(Domain::Stock.agent(), AgentName::StockAnalyst);
    }
}
