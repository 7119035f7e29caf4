use crate::SourceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One news article as returned by a news search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    /// Publication time as reported by the provider (ISO 8601).
    pub published_at: Option<String>,
    pub description: String,
    pub url: String,
}

impl NewsArticle {
    /// Publication date as `YYYY-MM-DD`, if known.
    pub fn published_date(&self) -> Option<&str> {
        self.published_at
            .as_deref()
            .map(|value| value.get(..10).unwrap_or(value))
    }
}

/// Searches recent news articles.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Most recent articles matching `query`, newest first, at most `page_size`.
    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>, SourceError>;
}

/// One product listing from a marketplace search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub num_ratings: Option<u64>,
    pub url: Option<String>,
}

/// Searches marketplace product listings.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Listings for `query` in relevance order; empty when nothing matched.
    async fn search(&self, query: &str) -> Result<Vec<Product>, SourceError>;
}

/// Latest quote for a ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<f64>,
}

impl StockQuote {
    /// Absolute change against the previous close.
    pub fn change(&self) -> Option<f64> {
        self.previous_close.map(|close| self.price - close)
    }

    /// Percentage change against the previous close.
    pub fn change_percent(&self) -> Option<f64> {
        self.previous_close
            .filter(|close| *close != 0.0)
            .map(|close| (self.price - close) / close * 100.0)
    }
}

/// Fetches stock quotes.
#[async_trait]
pub trait StockSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<StockQuote, SourceError>;
}
