//! Canned data sources and sample payloads.

use async_trait::async_trait;
use parking_lot::Mutex;
use researcher_rs_sources::{
    NewsArticle, NewsSource, Product, ProductSource, SourceError, StockQuote, StockSource,
};

/// `n` articles titled `Headline 1..=n`.
pub fn sample_articles(n: usize) -> Vec<NewsArticle> {
    (1..=n)
        .map(|idx| NewsArticle {
            title: format!("Headline {idx}"),
            source: "Wire".to_string(),
            published_at: Some(format!("2024-05-{idx:02}T09:00:00Z")),
            description: format!("Details for story {idx}."),
            url: format!("https://news.example.com/{idx}"),
        })
        .collect()
}

/// `n` products titled `Product 1..=n`, each rated 4.2 over 100 reviews.
pub fn sample_products(n: usize) -> Vec<Product> {
    (1..=n)
        .map(|idx| Product {
            title: format!("Product {idx}"),
            price: Some(format!("${}.99", 100 * idx)),
            rating: Some("4.2".to_string()),
            num_ratings: Some(100),
            url: Some(format!("https://www.amazon.com/dp/B{idx:09}")),
        })
        .collect()
}

/// Quote at 190.00 USD, up 5.00 from a 185.00 close.
pub fn sample_quote(symbol: &str) -> StockQuote {
    StockQuote {
        symbol: symbol.to_string(),
        name: Some(format!("{symbol} Inc.")),
        currency: Some("USD".to_string()),
        price: 190.0,
        previous_close: Some(185.0),
        day_high: Some(191.5),
        day_low: Some(184.25),
        volume: Some(52_345_678),
        market_cap: Some(2.95e12),
    }
}

#[derive(Debug)]
pub struct StubNewsSource {
    result: Result<Vec<NewsArticle>, SourceError>,
    last_page_size: Mutex<Option<u32>>,
}

impl StubNewsSource {
    pub fn with_articles(articles: Vec<NewsArticle>) -> Self {
        Self {
            result: Ok(articles),
            last_page_size: Mutex::new(None),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            result: Err(error),
            last_page_size: Mutex::new(None),
        }
    }

    pub fn last_page_size(&self) -> Option<u32> {
        *self.last_page_size.lock()
    }
}

#[async_trait]
impl NewsSource for StubNewsSource {
    async fn search(&self, _query: &str, page_size: u32) -> Result<Vec<NewsArticle>, SourceError> {
        *self.last_page_size.lock() = Some(page_size);
        self.result.clone().map(|articles| {
            articles
                .into_iter()
                .take(page_size as usize)
                .collect()
        })
    }
}

#[derive(Debug)]
pub struct StubProductSource {
    result: Result<Vec<Product>, SourceError>,
}

impl StubProductSource {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            result: Ok(products),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl ProductSource for StubProductSource {
    async fn search(&self, _query: &str) -> Result<Vec<Product>, SourceError> {
        self.result.clone()
    }
}

#[derive(Debug)]
pub struct StubStockSource {
    result: Result<StockQuote, SourceError>,
    last_symbol: Mutex<Option<String>>,
}

impl StubStockSource {
    pub fn with_quote(quote: StockQuote) -> Self {
        Self {
            result: Ok(quote),
            last_symbol: Mutex::new(None),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            result: Err(error),
            last_symbol: Mutex::new(None),
        }
    }

    /// Symbol passed to the most recent `quote` call.
    pub fn last_symbol(&self) -> Option<String> {
        self.last_symbol.lock().clone()
    }
}

#[async_trait]
impl StockSource for StubStockSource {
    async fn quote(&self, symbol: &str) -> Result<StockQuote, SourceError> {
        *self.last_symbol.lock() = Some(symbol.to_string());
        self.result.clone()
    }
}
