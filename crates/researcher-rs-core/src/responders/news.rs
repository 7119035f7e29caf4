use super::Responder;
use crate::ChatModel;
use async_trait::async_trait;
use log::{debug, warn};
use researcher_rs_protocol::AgentName;
use researcher_rs_sources::{NewsArticle, NewsSource, SourceError};
use std::sync::Arc;

/// Articles included in the answer and the summary prompt.
const TOP_ARTICLES: usize = 3;

const SYSTEM_PROMPT: &str = "You are a professional news analyst. Summarize real-world \
events neutrally and precisely. Only use the articles you are given; do not invent facts.";

/// Searches recent news and summarizes the top articles.
pub struct NewsResponder {
    source: Arc<dyn NewsSource>,
    llm: ChatModel,
    page_size: u32,
}

impl NewsResponder {
    pub fn new(source: Arc<dyn NewsSource>, llm: ChatModel) -> Self {
        Self {
            source,
            llm,
            page_size: 7,
        }
    }

    /// Articles requested from the source per query.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[async_trait]
impl Responder for NewsResponder {
    fn agent(&self) -> AgentName {
        AgentName::News
    }

    async fn respond(&self, query: &str) -> String {
        let articles = match self.source.search(query, self.page_size).await {
            Ok(articles) => articles,
            Err(err) => {
                warn!("news search failed (error={err})");
                return failure_text(&err);
            }
        };
        if articles.is_empty() {
            return format!("No recent news found for **{query}**.");
        }

        let top = &articles[..articles.len().min(TOP_ARTICLES)];
        let headlines = format_articles(top);
        debug!("summarizing news (articles={})", top.len());
        let analysis = match self.llm.ask(SYSTEM_PROMPT, &summary_prompt(query, &headlines)).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!("news summary failed (error={err})");
                format!("_Summary unavailable: {err}_")
            }
        };

        format!(
            "## Latest Real-World Analysis on: **{query}**\n\n\
             ### Top Headlines\n\n{headlines}\n\n---\n\n### Analysis\n\n{analysis}"
        )
    }
}

fn failure_text(err: &SourceError) -> String {
    match err {
        SourceError::MissingApiKey { env, .. } => {
            format!("News API key is missing. Please configure {env}.")
        }
        SourceError::Timeout(_) => "Request timed out. Please try again later.".to_string(),
        other => format!("News request failed: {other}"),
    }
}

fn format_articles(articles: &[NewsArticle]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(idx, article)| {
            format!(
                "**{number}. {title}**\n\
                 - Source: {source} | Date: {date}\n\
                 - {description}\n\
                 - [Read more]({url})",
                number = idx + 1,
                title = article.title,
                source = article.source,
                date = article.published_date().unwrap_or("Unknown Date"),
                description = article.description,
                url = article.url,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn summary_prompt(query: &str, headlines: &str) -> String {
    format!(
        "Topic: {query}\n\n\
         Articles:\n{headlines}\n\n\
         Write a neutral summary of what happened, then cover:\n\
         1. Key events\n\
         2. Impact on people, markets or industry\n\
         3. Risks and opportunities\n\
         4. A short conclusion"
    )
}
