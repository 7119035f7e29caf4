//! Assembly of the runtime graph from configuration.

use anyhow::{Context, Result};
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::groq::Groq;
use autoagents_llm::backends::openai::OpenAI;
use autoagents_llm::builder::LLMBuilder;
use log::{debug, info, warn};
use researcher_rs_config::{
    HistoryConfig, LlmBackend, LlmConfig, ResearcherConfig, SourcesConfig, StoreConfig,
};
use researcher_rs_core::{
    ChatModel, GeneralResponder, MarketResponder, NewsResponder, Orchestrator, Responders,
    StockResponder, Supervisor, validate_history_filter,
};
use researcher_rs_protocol::{HistoryFilter, HistoryPage};
use researcher_rs_sources::{AmazonProductSource, NewsApiSource, YahooQuoteSource};
use researcher_rs_store::{QueryStore, SqliteQueryStore};
use std::path::Path;
use std::sync::Arc;

/// Load an explicit config file, or the layered config rooted at the cwd.
pub fn load_config(path: Option<&Path>) -> Result<ResearcherConfig> {
    if let Some(path) = path {
        info!("loading config from path: {}", path.display());
        return ResearcherConfig::load_from_path(path).context("failed to load config");
    }
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    info!("loading layered config from cwd: {}", cwd.display());
    let layered = ResearcherConfig::load_layered(&cwd).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Build the configured chat backend. The API key must be present.
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LLMProvider>> {
    let api_key = config.api_key().context("language model API key is not set")?;
    info!(
        "building LLM provider (provider={:?}, model={})",
        config.provider, config.model
    );
    let llm: Arc<dyn LLMProvider> = match config.provider {
        LlmBackend::Groq => LLMBuilder::<Groq>::new()
            .api_key(api_key)
            .model(config.model.clone())
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .build()
            .context("failed to build Groq LLM provider")?,
        LlmBackend::OpenAI => LLMBuilder::<OpenAI>::new()
            .api_key(api_key)
            .model(config.model.clone())
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .build()
            .context("failed to build OpenAI LLM provider")?,
    };
    Ok(llm)
}

pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn QueryStore>> {
    info!("opening query store (path={})", config.path.display());
    let store = SqliteQueryStore::open(&config.path)
        .with_context(|| format!("failed to open query store at {}", config.path.display()))?;
    Ok(Arc::new(store))
}

/// One responder per domain, backed by the configured data sources.
///
/// Missing data-source keys are not fatal; the affected responder explains
/// the missing key in its answer.
pub fn build_responders(config: &SourcesConfig, llm: ChatModel) -> Result<Responders> {
    let news_key = config.news.api_key();
    if news_key.is_none() {
        warn!("news API key not set (env={})", config.news.api_key_env);
    }
    let market_key = config.market.api_key();
    if market_key.is_none() {
        warn!("market API key not set (env={})", config.market.api_key_env);
    }

    let news = NewsApiSource::new(&config.news, news_key).context("failed to build news source")?;
    let market = AmazonProductSource::new(&config.market, market_key)
        .context("failed to build market source")?;
    let stock = YahooQuoteSource::new(&config.stock).context("failed to build stock source")?;

    Ok(Responders {
        news: Arc::new(
            NewsResponder::new(Arc::new(news), llm.clone()).with_page_size(config.news.page_size),
        ),
        market: Arc::new(MarketResponder::new(Arc::new(market), llm.clone())),
        stock: Arc::new(StockResponder::new(
            Arc::new(stock),
            llm.clone(),
            config.stock.default_symbol.clone(),
        )),
        general: Arc::new(GeneralResponder::new(llm)),
    })
}

/// List history straight from the store, with the same limits the API applies.
pub async fn list_history(
    store: &dyn QueryStore,
    limits: &HistoryConfig,
    filter: &HistoryFilter,
) -> Result<HistoryPage> {
    validate_history_filter(filter, limits)?;
    Ok(store.list(filter).await?)
}

/// Wire router, responders and store into an orchestrator.
pub fn build_orchestrator(
    config: &ResearcherConfig,
    provider: Arc<dyn LLMProvider>,
    store: Arc<dyn QueryStore>,
) -> Result<Orchestrator> {
    let llm = ChatModel::new(provider).with_timeout(config.llm.timeout());
    let responders = build_responders(&config.sources, llm.clone())?;
    Ok(Orchestrator::new(Supervisor::new(llm, responders), store)
        .with_limits(config.history.clone()))
}
