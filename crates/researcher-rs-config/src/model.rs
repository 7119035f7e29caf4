//! Configuration schema for the researcher service.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root config for the researcher service and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResearcherConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl ResearcherConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ResearcherConfigBuilder {
        ResearcherConfigBuilder::new()
    }
}

/// Builder for assembling a `ResearcherConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ResearcherConfigBuilder {
    config: ResearcherConfig,
}

impl ResearcherConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResearcherConfig::default(),
        }
    }

    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = llm;
        self
    }

    pub fn sources(mut self, sources: SourcesConfig) -> Self {
        self.config.sources = sources;
        self
    }

    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    pub fn history(mut self, history: HistoryConfig) -> Self {
        self.config.history = history;
        self
    }

    /// Finalize and validate the built config.
    pub fn build(self) -> Result<ResearcherConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Language-model backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Groq,
    OpenAI,
}

impl LlmBackend {
    pub const NAMES: [&'static str; 2] = ["groq", "openai"];
}

/// Language-model client settings shared by the router and every responder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmBackend,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Environment variable holding the provider API key.
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::default(),
            model: default_llm_model(),
            api_key_env: default_llm_api_key_env(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        require_env(&self.api_key_env)
    }
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_llm_temperature() -> f32 {
    0.1
}

fn default_llm_max_tokens() -> u32 {
    1024
}

fn default_llm_timeout_secs() -> u64 {
    15
}

/// Settings for the three external data sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub news: NewsSourceConfig,
    #[serde(default)]
    pub market: MarketSourceConfig,
    #[serde(default)]
    pub stock: StockSourceConfig,
}

/// NewsAPI `everything` search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSourceConfig {
    #[serde(default = "default_news_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_news_page_size")]
    pub page_size: u32,
    #[serde(default = "default_news_language")]
    pub language: String,
    #[serde(default = "default_news_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NewsSourceConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_news_api_key_env(),
            endpoint: default_news_endpoint(),
            page_size: default_news_page_size(),
            language: default_news_language(),
            timeout_secs: default_news_timeout_secs(),
        }
    }
}

impl NewsSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn api_key(&self) -> Option<String> {
        optional_env(&self.api_key_env)
    }
}

fn default_news_api_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

fn default_news_endpoint() -> String {
    "https://newsapi.org/v2/everything".to_string()
}

fn default_news_page_size() -> u32 {
    7
}

fn default_news_language() -> String {
    "en".to_string()
}

fn default_news_timeout_secs() -> u64 {
    10
}

/// RapidAPI real-time Amazon product search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSourceConfig {
    #[serde(default = "default_market_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_market_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_market_host")]
    pub host: String,
    #[serde(default = "default_market_country")]
    pub country: String,
    #[serde(default = "default_market_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketSourceConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_market_api_key_env(),
            endpoint: default_market_endpoint(),
            host: default_market_host(),
            country: default_market_country(),
            timeout_secs: default_market_timeout_secs(),
        }
    }
}

impl MarketSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn api_key(&self) -> Option<String> {
        optional_env(&self.api_key_env)
    }
}

fn default_market_api_key_env() -> String {
    "RAPIDAPI_KEY".to_string()
}

fn default_market_endpoint() -> String {
    "https://real-time-amazon-data.p.rapidapi.com/search".to_string()
}

fn default_market_host() -> String {
    "real-time-amazon-data.p.rapidapi.com".to_string()
}

fn default_market_country() -> String {
    "US".to_string()
}

fn default_market_timeout_secs() -> u64 {
    15
}

/// Yahoo Finance endpoints used for stock quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSourceConfig {
    #[serde(default = "default_stock_endpoint")]
    pub endpoint: String,
    /// Quote summary endpoint for market cap; empty disables the lookup.
    #[serde(default = "default_stock_summary_endpoint")]
    pub summary_endpoint: String,
    /// Ticker used when none can be extracted from the query.
    #[serde(default = "default_stock_symbol")]
    pub default_symbol: String,
    #[serde(default = "default_stock_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StockSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_stock_endpoint(),
            summary_endpoint: default_stock_summary_endpoint(),
            default_symbol: default_stock_symbol(),
            timeout_secs: default_stock_timeout_secs(),
        }
    }
}

impl StockSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_stock_endpoint() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}

fn default_stock_summary_endpoint() -> String {
    "https://query2.finance.yahoo.com/v10/finance/quoteSummary".to_string()
}

fn default_stock_symbol() -> String {
    "AAPL".to_string()
}

fn default_stock_timeout_secs() -> u64 {
    10
}

/// Query history persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path; relative paths resolve against the working directory.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".researcher").join("history.db")
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

/// Input bounds applied to queries and history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: usize,
    #[serde(default = "default_history_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
    #[serde(default = "default_max_search_chars")]
    pub max_search_chars: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
            max_limit: default_history_max_limit(),
            max_query_chars: default_max_query_chars(),
            max_search_chars: default_max_search_chars(),
        }
    }
}

fn default_history_limit() -> usize {
    researcher_rs_protocol::DEFAULT_HISTORY_LIMIT
}

fn default_history_max_limit() -> usize {
    researcher_rs_protocol::MAX_HISTORY_LIMIT
}

fn default_max_query_chars() -> usize {
    1000
}

fn default_max_search_chars() -> usize {
    200
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    optional_env(name).ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
