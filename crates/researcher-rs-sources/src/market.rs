//! RapidAPI real-time Amazon product search adapter.

use crate::http::{build_client, fetch_json};
use crate::{Product, ProductSource, SourceError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use researcher_rs_config::MarketSourceConfig;
use serde::Deserialize;
use serde_json::Value;

pub struct AmazonProductSource {
    client: Client,
    endpoint: String,
    host: String,
    country: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl AmazonProductSource {
    pub fn new(config: &MarketSourceConfig, api_key: Option<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: config.endpoint.clone(),
            host: config.host.clone(),
            country: config.country.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }
}

#[async_trait]
impl ProductSource for AmazonProductSource {
    async fn search(&self, query: &str) -> Result<Vec<Product>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::MissingApiKey {
                service: "RapidAPI",
                env: self.api_key_env.clone(),
            });
        };
        let request = self
            .client
            .get(&self.endpoint)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", self.host.as_str())
            .query(&[
                ("query", query),
                ("page", "1"),
                ("country", self.country.as_str()),
                ("sort_by", "RELEVANCE"),
                ("product_condition", "ALL"),
            ]);
        let response: SearchResponse = fetch_json(request).await?;
        let products = into_products(response);
        debug!("product search complete (products={})", products.len());
        Ok(products)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    products: Vec<ProductDto>,
}

#[derive(Debug, Deserialize)]
struct ProductDto {
    product_title: Option<String>,
    product_price: Option<Value>,
    product_star_rating: Option<Value>,
    product_num_ratings: Option<Value>,
    product_url: Option<String>,
}

/// Listings from a search response; anything but `OK` counts as no results.
fn into_products(response: SearchResponse) -> Vec<Product> {
    if response.status != "OK" {
        debug!("product search returned status {}", response.status);
        return Vec::new();
    }
    response
        .data
        .map(|data| data.products)
        .unwrap_or_default()
        .into_iter()
        .map(|product| Product {
            title: product
                .product_title
                .unwrap_or_else(|| "Untitled product".to_string()),
            price: product.product_price.and_then(display_value),
            rating: product.product_star_rating.and_then(display_value),
            num_ratings: product.product_num_ratings.and_then(|value| match value {
                Value::Number(number) => number.as_u64(),
                Value::String(text) => text.replace(',', "").parse().ok(),
                _ => None,
            }),
            url: product.product_url,
        })
        .collect()
}

/// Providers send prices and ratings as either strings or numbers.
fn display_value(value: Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::decode;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_products_with_mixed_value_types() {
        let body = br#"{
            "status": "OK",
            "data": {
                "products": [
                    {
                        "product_title": "Laptop 14",
                        "product_price": "$499.99",
                        "product_star_rating": "4.4",
                        "product_num_ratings": 1532,
                        "product_url": "https://www.amazon.com/dp/X"
                    },
                    {
                        "product_title": "Laptop 15",
                        "product_price": null,
                        "product_star_rating": 4,
                        "product_num_ratings": "2,001",
                        "product_url": null
                    }
                ]
            }
        }"#;
        let products = into_products(decode(body).expect("decode"));
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price.as_deref(), Some("$499.99"));
        assert_eq!(products[0].num_ratings, Some(1532));
        assert_eq!(products[1].price, None);
        assert_eq!(products[1].rating.as_deref(), Some("4"));
        assert_eq!(products[1].num_ratings, Some(2001));
    }

    #[test]
    fn non_ok_status_means_no_products() {
        let body = br#"{ "status": "ERROR", "error": { "message": "bad query" } }"#;
        assert!(into_products(decode(body).expect("decode")).is_empty());
    }
}
