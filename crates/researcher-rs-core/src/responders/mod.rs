//! Domain responders.
//!
//! Each responder turns a query into markdown prose: it fetches supporting
//! data from one external source, asks the model to summarize it, and folds
//! every failure into the returned text so routing never has to.

mod general;
mod market;
mod news;
mod stock;
pub mod ticker;

pub use general::GeneralResponder;
pub use market::MarketResponder;
pub use news::NewsResponder;
pub use stock::StockResponder;

use async_trait::async_trait;
use researcher_rs_protocol::{AgentName, Domain};
use std::sync::Arc;

/// Produces the final answer for one domain.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Agent name recorded for answers from this responder.
    fn agent(&self) -> AgentName;

    /// Answer `query`. Never fails; errors are reported in the text.
    async fn respond(&self, query: &str) -> String;
}

/// One responder per routing domain.
#[derive(Clone)]
pub struct Responders {
    pub news: Arc<dyn Responder>,
    pub market: Arc<dyn Responder>,
    pub stock: Arc<dyn Responder>,
    pub general: Arc<dyn Responder>,
}

impl Responders {
    pub fn for_domain(&self, domain: Domain) -> &Arc<dyn Responder> {
        match domain {
            Domain::News => &self.news,
            Domain::Market => &self.market,
            Domain::Stock => &self.stock,
            Domain::General => &self.general,
        }
    }
}

/// Placeholder for optional values in formatted output.
pub(crate) fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}
