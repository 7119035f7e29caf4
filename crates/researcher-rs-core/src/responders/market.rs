use super::{Responder, or_na};
use crate::ChatModel;
use async_trait::async_trait;
use log::warn;
use researcher_rs_protocol::AgentName;
use researcher_rs_sources::{Product, ProductSource, SourceError};
use std::sync::Arc;

const TOP_PRODUCTS: usize = 4;

const SYSTEM_PROMPT: &str = "You are an e-commerce market analyst. Compare the listed \
products on price, rating and review volume, then recommend the best value option and \
say who each product suits. Be concise and only use the data provided.";

/// Product research over marketplace listings.
pub struct MarketResponder {
    source: Arc<dyn ProductSource>,
    llm: ChatModel,
}

impl MarketResponder {
    pub fn new(source: Arc<dyn ProductSource>, llm: ChatModel) -> Self {
        Self { source, llm }
    }
}

#[async_trait]
impl Responder for MarketResponder {
    fn agent(&self) -> AgentName {
        AgentName::MarketResearch
    }

    async fn respond(&self, query: &str) -> String {
        let products = match self.source.search(query).await {
            Ok(products) => products,
            Err(SourceError::MissingApiKey { env, .. }) => {
                return format!("RapidAPI key not configured. Set {env} to enable market research.");
            }
            Err(err) => {
                warn!("product search failed (error={err})");
                return format!("Market research failed: {err}");
            }
        };
        if products.is_empty() {
            return format!("No products found for '{query}' on Amazon.");
        }

        let listing = format_products(&products[..products.len().min(TOP_PRODUCTS)]);
        let prompt = format!("Shopper question: {query}\n\nProducts:\n{listing}");
        let analysis = match self.llm.ask(SYSTEM_PROMPT, &prompt).await {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!("market analysis failed (error={err})");
                format!("_Analysis unavailable: {err}_")
            }
        };
        format!("### Market Research: {query}\n\n{listing}\n\n**Analysis:**\n{analysis}")
    }
}

fn format_products(products: &[Product]) -> String {
    products
        .iter()
        .enumerate()
        .map(|(idx, product)| {
            let reviews = product
                .num_ratings
                .map(|count| format!(" ({count} reviews)"))
                .unwrap_or_default();
            let mut entry = format!(
                "**{}. {}**\n- Price: {}\n- Rating: {}/5{}",
                idx + 1,
                product.title,
                or_na(product.price.clone()),
                or_na(product.rating.clone()),
                reviews
            );
            if let Some(url) = &product.url {
                entry.push_str(&format!("\n- [View on Amazon]({url})"));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
