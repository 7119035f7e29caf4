//! Yahoo Finance adapter: chart endpoint for prices, quote summary for market cap.

use crate::http::{build_client, decode, fetch, fetch_json, status_error};
use crate::{SourceError, StockQuote, StockSource};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use researcher_rs_config::StockSourceConfig;
use serde::Deserialize;

pub struct YahooQuoteSource {
    client: Client,
    endpoint: String,
    summary_endpoint: Option<String>,
}

impl YahooQuoteSource {
    pub fn new(config: &StockSourceConfig) -> Result<Self, SourceError> {
        let summary_endpoint = config.summary_endpoint.trim().trim_end_matches('/');
        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            summary_endpoint: (!summary_endpoint.is_empty()).then(|| summary_endpoint.to_string()),
        })
    }

    /// Market capitalisation from the quote summary `price` module.
    async fn market_cap(&self, endpoint: &str, symbol: &str) -> Result<Option<f64>, SourceError> {
        let request = self
            .client
            .get(format!("{endpoint}/{symbol}"))
            .query(&[("modules", "price")]);
        summary_market_cap(fetch_json(request).await?)
    }
}

#[async_trait]
impl StockSource for YahooQuoteSource {
    async fn quote(&self, symbol: &str) -> Result<StockQuote, SourceError> {
        let url = format!("{}/{}", self.endpoint, symbol);
        let request = self
            .client
            .get(url)
            .query(&[("range", "1d"), ("interval", "1d")]);
        let (status, body) = fetch(request).await?;
        // Unknown symbols come back as 404 with a chart error payload.
        match decode::<ChartResponse>(&body) {
            Ok(response) => {
                let mut quote = into_quote(symbol, response)?;
                if let Some(endpoint) = self.summary_endpoint.as_deref() {
                    match self.market_cap(endpoint, &quote.symbol).await {
                        Ok(market_cap) => quote.market_cap = market_cap,
                        Err(err) => {
                            warn!("market cap lookup failed (symbol={}, error={err})", quote.symbol)
                        }
                    }
                }
                debug!(
                    "stock quote fetched (symbol={}, price={}, market_cap={:?})",
                    quote.symbol, quote.price, quote.market_cap
                );
                Ok(quote)
            }
            Err(_) if !status.is_success() => Err(status_error(status, &body)),
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(default)]
    price: Option<SummaryPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryPrice {
    #[serde(default)]
    market_cap: Option<RawValue>,
}

/// Yahoo's `{ "raw": 2.95e12, "fmt": "2.95T" }` number wrapper.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn into_quote(symbol: &str, response: ChartResponse) -> Result<StockQuote, SourceError> {
    if let Some(error) = response.chart.error {
        return Err(if error.code.eq_ignore_ascii_case("Not Found") {
            SourceError::NotFound(symbol.to_string())
        } else {
            SourceError::Api(error.description.unwrap_or(error.code))
        });
    }
    let meta = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| result.meta)
        .ok_or_else(|| SourceError::NotFound(symbol.to_string()))?;
    let price = meta
        .regular_market_price
        .ok_or_else(|| SourceError::Decode(format!("no market price for {symbol}")))?;

    Ok(StockQuote {
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        name: meta.long_name.or(meta.short_name),
        currency: meta.currency,
        price,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
        day_high: meta.regular_market_day_high,
        day_low: meta.regular_market_day_low,
        volume: meta.regular_market_volume,
        market_cap: None,
    })
}

fn summary_market_cap(response: SummaryResponse) -> Result<Option<f64>, SourceError> {
    if let Some(error) = response.quote_summary.error {
        return Err(SourceError::Api(error.description.unwrap_or(error.code)));
    }
    Ok(response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.price)
        .and_then(|price| price.market_cap)
        .and_then(|cap| cap.raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_chart_meta_into_quote() {
        let body = br#"{
            "chart": {
                "result": [{
                    "meta": {
                        "currency": "USD",
                        "symbol": "AAPL",
                        "longName": "Apple Inc.",
                        "regularMarketPrice": 190.5,
                        "chartPreviousClose": 188.0,
                        "regularMarketDayHigh": 191.0,
                        "regularMarketDayLow": 187.25,
                        "regularMarketVolume": 51234000
                    },
                    "timestamp": [1714570200]
                }],
                "error": null
            }
        }"#;
        let quote = into_quote("AAPL", decode(body).expect("decode")).expect("quote");
        assert_eq!(quote.name.as_deref(), Some("Apple Inc."));
        assert_eq!(quote.previous_close, Some(188.0));
        assert_eq!(quote.change(), Some(2.5));
        assert_eq!(quote.volume, Some(51_234_000));
        assert_eq!(quote.market_cap, None);
    }

    #[test]
    fn summary_price_module_carries_market_cap() {
        let body = br#"{
            "quoteSummary": {
                "result": [{
                    "price": {
                        "symbol": "AAPL",
                        "marketCap": { "raw": 2950000000000, "fmt": "2.95T", "longFmt": "2,950,000,000,000" }
                    }
                }],
                "error": null
            }
        }"#;
        let cap = summary_market_cap(decode(body).expect("decode")).expect("market cap");
        assert_eq!(cap, Some(2.95e12));
    }

    #[test]
    fn summary_errors_are_reported() {
        let body = br#"{
            "quoteSummary": {
                "result": null,
                "error": { "code": "Unauthorized", "description": "Invalid Crumb" }
            }
        }"#;
        let err = summary_market_cap(decode(body).expect("decode")).unwrap_err();
        assert!(matches!(err, SourceError::Api(ref message) if message == "Invalid Crumb"), "{err}");
    }

    #[test]
    fn unknown_symbols_are_not_found() {
        let body = br#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        let err = into_quote("ZZZZZ", decode(body).expect("decode")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(symbol) if symbol == "ZZZZZ"));
    }
}
