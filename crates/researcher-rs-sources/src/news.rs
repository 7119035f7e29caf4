//! NewsAPI `everything` search adapter.

use crate::http::{build_client, decode, fetch, status_error};
use crate::{NewsArticle, NewsSource, SourceError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use researcher_rs_config::NewsSourceConfig;
use serde::Deserialize;

/// News search backed by newsapi.org.
pub struct NewsApiSource {
    client: Client,
    endpoint: String,
    language: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl NewsApiSource {
    /// Build the adapter; a missing key is reported on first use, not here.
    pub fn new(config: &NewsSourceConfig, api_key: Option<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::MissingApiKey {
                service: "News",
                env: self.api_key_env.clone(),
            });
        };
        let page_size = page_size.to_string();
        let request = self.client.get(&self.endpoint).query(&[
            ("q", query),
            ("sortBy", "publishedAt"),
            ("pageSize", page_size.as_str()),
            ("language", self.language.as_str()),
            ("apiKey", api_key),
        ]);
        let (status, body) = fetch(request).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        let articles = parse_articles(&body)?;
        debug!("news search complete (articles={})", articles.len());
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleDto {
    title: Option<String>,
    source: Option<ArticleSourceDto>,
    published_at: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSourceDto {
    name: Option<String>,
}

fn parse_articles(body: &[u8]) -> Result<Vec<NewsArticle>, SourceError> {
    let response: EverythingResponse = decode(body)?;
    if response.status != "ok" {
        return Err(SourceError::Api(
            response
                .message
                .unwrap_or_else(|| format!("status {}", response.status)),
        ));
    }
    Ok(response
        .articles
        .into_iter()
        .map(|article| NewsArticle {
            title: non_empty(article.title).unwrap_or_else(|| "No Title".to_string()),
            source: non_empty(article.source.and_then(|source| source.name))
                .unwrap_or_else(|| "Unknown Source".to_string()),
            published_at: non_empty(article.published_at),
            description: non_empty(article.description)
                .unwrap_or_else(|| "No description available.".to_string()),
            url: non_empty(article.url).unwrap_or_else(|| "#".to_string()),
        })
        .collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_articles_with_fallbacks() {
        let body = br#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": { "id": null, "name": "Reuters" },
                    "title": "Chipmakers rally",
                    "description": "Shares rose.",
                    "url": "https://example.com/a",
                    "publishedAt": "2024-05-01T09:00:00Z"
                },
                { "source": { "id": null, "name": null }, "title": "", "description": null, "url": null }
            ]
        }"#;
        let articles = parse_articles(body).expect("articles");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].published_date(), Some("2024-05-01"));
        assert_eq!(articles[1].title, "No Title");
        assert_eq!(articles[1].source, "Unknown Source");
        assert_eq!(articles[1].description, "No description available.");
        assert_eq!(articles[1].url, "#");
    }

    #[test]
    fn provider_errors_carry_the_message() {
        let body = br#"{ "status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid." }"#;
        let err = parse_articles(body).unwrap_err();
        assert!(matches!(err, SourceError::Api(message) if message == "Your API key is invalid."));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let source = NewsApiSource::new(&NewsSourceConfig::default(), None).expect("source");
        let err = source.search("ai", 7).await.unwrap_err();
        assert!(
            matches!(err, SourceError::MissingApiKey { ref env, .. } if env == "NEWS_API_KEY"),
            "{err}"
        );
    }
}
