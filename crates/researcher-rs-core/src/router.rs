//! Single-hop query routing.

use crate::ChatModel;
use crate::llm::{system_message, user_message};
use crate::responders::Responders;
use crate::responders::ticker::mentions_known_ticker;
use futures_util::FutureExt;
use log::{error, info, warn};
use researcher_rs_protocol::{AgentName, Domain, RouteResult};
use std::any::Any;
use std::panic::AssertUnwindSafe;

const ROUTING_PROMPT: &str = "You route user queries to exactly one specialist. \
Reply with ONLY one word from this list:\n\
- news: current events, headlines, recent developments\n\
- market: products, shopping, prices, reviews, comparisons\n\
- stock: shares, tickers, equity prices, company valuations\n\
- general: anything else\n\
No punctuation, no explanation.";

const NEWS_KEYWORDS: &[&str] = &["news", "article", "latest", "headlines", "breaking"];
const MARKET_KEYWORDS: &[&str] = &[
    "price", "feature", "buy", "review", "product", "laptop", "iphone", "cheap",
];
const STOCK_KEYWORDS: &[&str] = &[
    "stock", "share", "nasdaq", "nyse", "ticker", "market cap", "trading",
];

/// Classifies each query into a [`Domain`] and runs exactly one responder.
#[derive(Clone)]
pub struct Supervisor {
    llm: ChatModel,
    responders: Responders,
}

impl Supervisor {
    pub fn new(llm: ChatModel, responders: Responders) -> Self {
        Self { llm, responders }
    }

    /// Resolve the domain for `query`.
    ///
    /// A model reply naming no domain, or a failed model call, falls back to
    /// keyword scoring.
    pub async fn classify(&self, query: &str) -> Domain {
        let messages = [system_message(ROUTING_PROMPT), user_message(query)];
        match self.llm.invoke(&messages).await {
            Ok(reply) => match domain_from_reply(&reply) {
                Some(domain) => {
                    info!("query classified (domain={domain}, by=llm)");
                    domain
                }
                None => {
                    let domain = keyword_domain(query);
                    info!("unrecognised routing reply (reply={reply:?}, domain={domain}, by=keywords)");
                    domain
                }
            },
            Err(err) => {
                let domain = keyword_domain(query);
                warn!("routing call failed (error={err}, domain={domain}, by=keywords)");
                domain
            }
        }
    }

    /// Classify and answer `query`.
    ///
    /// Never fails: a panic anywhere in classification or dispatch is reported
    /// as a response from [`AgentName::Error`].
    pub async fn route(&self, query: &str) -> RouteResult {
        let run = async {
            let domain = self.classify(query).await;
            let responder = self.responders.for_domain(domain);
            (domain.agent(), responder.respond(query).await)
        };
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok((agent, response)) => RouteResult {
                agent,
                response,
                query: query.to_string(),
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("query routing panicked (error={message})");
                RouteResult {
                    agent: AgentName::Error,
                    response: format!("System error: {message}"),
                    query: query.to_string(),
                }
            }
        }
    }
}

/// First domain label found in a model reply, in priority order.
pub fn domain_from_reply(reply: &str) -> Option<Domain> {
    let reply = reply.trim().to_lowercase();
    Domain::PRIORITY
        .into_iter()
        .find(|domain| reply.contains(domain.label()))
}

/// Deterministic domain from keyword hits; ties keep priority order.
///
/// Keywords match as substrings of the lowercased query, so "stocks" and
/// "laptops" count. Ticker and company mentions match whole words only.
pub fn keyword_domain(query: &str) -> Domain {
    let lowered = query.to_lowercase();
    let hits = |keywords: &[&str]| -> usize {
        keywords
            .iter()
            .filter(|&&keyword| lowered.contains(keyword))
            .count()
    };

    let scores = [
        (Domain::News, hits(NEWS_KEYWORDS)),
        (Domain::Market, hits(MARKET_KEYWORDS)),
        (
            Domain::Stock,
            hits(STOCK_KEYWORDS) + usize::from(mentions_known_ticker(query)),
        ),
    ];
    let mut best = (Domain::General, 0);
    for (domain, score) in scores {
        if score > best.1 {
            best = (domain, score);
        }
    }
    best.0
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "responder panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Responder;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use researcher_rs_test_utils::{FailingLLM, FixedLLM, ScriptedLLM};
    use std::sync::Arc;

    struct EchoResponder(AgentName);

    #[async_trait]
    impl Responder for EchoResponder {
        fn agent(&self) -> AgentName {
            self.0
        }

        async fn respond(&self, query: &str) -> String {
            format!("{} answered {query}", self.0)
        }
    }

    struct PanickingResponder;

    #[async_trait]
    impl Responder for PanickingResponder {
        fn agent(&self) -> AgentName {
            AgentName::News
        }

        async fn respond(&self, _query: &str) -> String {
            panic!("feed parser exploded")
        }
    }

    fn echo_responders() -> Responders {
        Responders {
            news: Arc::new(EchoResponder(AgentName::News)),
            market: Arc::new(EchoResponder(AgentName::MarketResearch)),
            stock: Arc::new(EchoResponder(AgentName::StockAnalyst)),
            general: Arc::new(EchoResponder(AgentName::GeneralAssistant)),
        }
    }

    #[test]
    fn reply_matching_follows_priority() {
        assert_eq!(domain_from_reply("  Stock\n"), Some(Domain::Stock));
        assert_eq!(domain_from_reply("market"), Some(Domain::Market));
        assert_eq!(domain_from_reply("news or stock"), Some(Domain::News));
        assert_eq!(domain_from_reply("stock_market"), Some(Domain::Market));
        assert_eq!(domain_from_reply("I cannot decide"), None);
    }

    #[test]
    fn keyword_scoring() {
        assert_eq!(keyword_domain("AAPL stock price"), Domain::Stock);
        assert_eq!(keyword_domain("latest iPhone price review"), Domain::Market);
        assert_eq!(keyword_domain("breaking news headlines"), Domain::News);
        assert_eq!(keyword_domain("What is the capital of France?"), Domain::General);
        assert_eq!(keyword_domain("tesla market cap"), Domain::Stock);
    }

    #[test]
    fn keyword_plurals_and_inflections_count() {
        assert_eq!(keyword_domain("cheapest laptops with good reviews"), Domain::Market);
        assert_eq!(keyword_domain("which stocks should I watch"), Domain::Stock);
        assert_eq!(keyword_domain("show me recent articles about chips"), Domain::News);
        assert_eq!(keyword_domain("Shares of Nvidia"), Domain::Stock);
    }

    #[test]
    fn ticker_bonus_needs_a_whole_word() {
        // "meta" inside "metadata" is not a company mention.
        assert_eq!(keyword_domain("metadata formats explained"), Domain::General);
        assert_eq!(keyword_domain("meta"), Domain::Stock);
    }

    #[test]
    fn keyword_ties_keep_priority_order() {
        assert_eq!(keyword_domain("latest laptop"), Domain::News);
        assert_eq!(keyword_domain("cheap shares"), Domain::Market);
    }

    #[tokio::test]
    async fn routes_by_model_reply() {
        let supervisor = Supervisor::new(
            ChatModel::new(Arc::new(FixedLLM::new("market"))),
            echo_responders(),
        );
        let result = supervisor.route("best noise cancelling headphones").await;
        assert_eq!(result.agent, AgentName::MarketResearch);
        assert_eq!(
            result.response,
            "Market Research Agent answered best noise cancelling headphones"
        );
        assert_eq!(result.query, "best noise cancelling headphones");
    }

    #[tokio::test]
    async fn unrecognised_reply_uses_keywords() {
        let supervisor = Supervisor::new(
            ChatModel::new(Arc::new(ScriptedLLM::new(["hmm, hard to say"]))),
            echo_responders(),
        );
        assert_eq!(
            supervisor.classify("breaking headlines today").await,
            Domain::News
        );
    }

    #[tokio::test]
    async fn model_failure_uses_keywords() {
        let supervisor = Supervisor::new(
            ChatModel::new(Arc::new(FailingLLM::new("rate limited"))),
            echo_responders(),
        );
        let result = supervisor.route("AAPL stock price").await;
        assert_eq!(result.agent, AgentName::StockAnalyst);
    }

    #[tokio::test]
    async fn responder_panic_becomes_error_agent() {
        let mut responders = echo_responders();
        responders.news = Arc::new(PanickingResponder);
        let supervisor = Supervisor::new(ChatModel::new(Arc::new(FixedLLM::new("news"))), responders);

        let result = supervisor.route("latest news").await;
        assert_eq!(result.agent, AgentName::Error);
        assert_eq!(result.response, "System error: feed parser exploded");
        assert_eq!(result.query, "latest news");
    }
}
