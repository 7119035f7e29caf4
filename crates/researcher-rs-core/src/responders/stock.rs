use super::Responder;
use super::ticker::extract_symbol;
use crate::ChatModel;
use async_trait::async_trait;
use log::{info, warn};
use researcher_rs_protocol::AgentName;
use researcher_rs_sources::{StockQuote, StockSource};
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a sell-side equity analyst. Given a stock's latest \
quote, explain the day's move, what the valuation and volume suggest, and the main risks. \
Be brief and factual. Do not give personalised investment advice.";

/// Quotes a ticker and asks the model for a short insight.
pub struct StockResponder {
    source: Arc<dyn StockSource>,
    llm: ChatModel,
    default_symbol: String,
}

impl StockResponder {
    pub fn new(source: Arc<dyn StockSource>, llm: ChatModel, default_symbol: impl Into<String>) -> Self {
        Self {
            source,
            llm,
            default_symbol: default_symbol.into(),
        }
    }
}

#[async_trait]
impl Responder for StockResponder {
    fn agent(&self) -> AgentName {
        AgentName::StockAnalyst
    }

    async fn respond(&self, query: &str) -> String {
        let symbol = extract_symbol(query).unwrap_or_else(|| self.default_symbol.clone());
        info!("quoting stock (symbol={symbol})");
        let quote = match self.source.quote(&symbol).await {
            Ok(quote) => quote,
            Err(err) => {
                warn!("stock quote failed (symbol={symbol}, error={err})");
                return format!("Could not fetch stock data for {symbol}: {err}");
            }
        };

        let stats = format_quote(&quote);
        let prompt = format!("Question: {query}\n\nLatest data for {symbol}:\n{stats}");
        let insight = match self.llm.ask(SYSTEM_PROMPT, &prompt).await {
            Ok(insight) => insight,
            Err(err) => {
                warn!("stock insight failed (symbol={symbol}, error={err})");
                format!("_Insight unavailable: {err}_")
            }
        };
        format!(
            "### Stock Analysis: {}\n{stats}\n\n**Insight:**\n{insight}",
            quote.symbol
        )
    }
}

fn format_quote(quote: &StockQuote) -> String {
    let currency = quote.currency.as_deref().unwrap_or("USD");
    let mut lines = Vec::new();
    if let Some(name) = &quote.name {
        lines.push(format!("- Company: {name}"));
    }
    lines.push(format!("- Price: {:.2} {currency}", quote.price));
    match (quote.change(), quote.change_percent()) {
        (Some(change), Some(percent)) => {
            lines.push(format!("- Change: {change:+.2} ({percent:+.2}%)"));
        }
        (Some(change), None) => lines.push(format!("- Change: {change:+.2}")),
        _ => lines.push("- Change: N/A".to_string()),
    }
    if let (Some(low), Some(high)) = (quote.day_low, quote.day_high) {
        lines.push(format!("- Day Range: {low:.2} - {high:.2}"));
    }
    if let Some(volume) = quote.volume {
        lines.push(format!("- Volume: {}", group_thousands(volume)));
    }
    if let Some(cap) = quote.market_cap {
        lines.push(format!("- Market Cap: {:.2}B {currency}", cap / 1e9));
    }
    lines.join("\n")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
