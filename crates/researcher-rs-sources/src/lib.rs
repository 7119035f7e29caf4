//! Clients for the external data sources consulted by the responders.
//!
//! Each source is a narrow async trait with one reqwest-backed adapter. The
//! adapters own transport details only: request parameters, timeouts, status
//! mapping and JSON decoding into the small domain types defined here.

mod error;
mod http;
mod market;
mod news;
mod stock;
mod types;

pub use error::SourceError;
pub use market::AmazonProductSource;
pub use news::NewsApiSource;
pub use stock::YahooQuoteSource;
pub use types::{NewsArticle, NewsSource, Product, ProductSource, StockQuote, StockSource};
