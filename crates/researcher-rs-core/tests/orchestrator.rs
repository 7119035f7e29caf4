use async_trait::async_trait;
use pretty_assertions::assert_eq;
use researcher_rs_config::HistoryConfig;
use researcher_rs_core::{ChatModel, CoreError, Orchestrator, Responder, Responders, Supervisor};
use researcher_rs_protocol::{
    AgentName, HistoryFilter, HistoryPage, NewQueryRecord, QueryId, QueryRecord, QueryStatistics,
};
use researcher_rs_store::{QueryStore, SqliteQueryStore, StoreError};
use researcher_rs_test_utils::{FailingLLM, FixedLLM};
use std::sync::Arc;

struct CannedResponder(AgentName);

#[async_trait]
impl Responder for CannedResponder {
    fn agent(&self) -> AgentName {
        self.0
    }

    async fn respond(&self, query: &str) -> String {
        format!("[{}] {query}", self.0)
    }
}

fn canned_responders() -> Responders {
    Responders {
        news: Arc::new(CannedResponder(AgentName::News)),
        market: Arc::new(CannedResponder(AgentName::MarketResearch)),
        stock: Arc::new(CannedResponder(AgentName::StockAnalyst)),
        general: Arc::new(CannedResponder(AgentName::GeneralAssistant)),
    }
}

fn orchestrator_with(llm: ChatModel, store: Arc<dyn QueryStore>) -> Orchestrator {
    Orchestrator::new(Supervisor::new(llm, canned_responders()), store)
}

fn orchestrator(route_reply: &str) -> Orchestrator {
    let store = SqliteQueryStore::in_memory().expect("store");
    orchestrator_with(
        ChatModel::new(Arc::new(FixedLLM::new(route_reply))),
        Arc::new(store),
    )
}

/// Store whose backend is always down.
struct UnavailableStore;

#[async_trait]
impl QueryStore for UnavailableStore {
    async fn insert(&self, _record: NewQueryRecord) -> Result<QueryRecord, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn get(&self, _id: QueryId) -> Result<Option<QueryRecord>, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn list(&self, _filter: &HistoryFilter) -> Result<HistoryPage, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn statistics(&self) -> Result<QueryStatistics, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn delete(&self, _id: QueryId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }
}

#[tokio::test]
async fn submit_routes_and_persists() {
    let orchestrator = orchestrator("news");
    let record = orchestrator
        .submit("  What's the latest news on AI?  ")
        .await
        .expect("submit");

    assert_eq!(record.agent, AgentName::News);
    assert_eq!(record.query, "What's the latest news on AI?");
    assert_eq!(record.response, "[News Agent] What's the latest news on AI?");
    assert!((100..=999).contains(&record.id.get()));
    assert!(record.execution_time >= 0.0);

    let stored = orchestrator.get(record.id).await.expect("get");
    assert_eq!(stored, Some(record));
}

#[tokio::test]
async fn submit_falls_back_to_keywords_when_the_model_is_down() {
    let store = SqliteQueryStore::in_memory().expect("store");
    let orchestrator = orchestrator_with(
        ChatModel::new(Arc::new(FailingLLM::new("connection refused"))),
        Arc::new(store),
    );
    let record = orchestrator.submit("AAPL stock price").await.expect("submit");
    assert_eq!(record.agent, AgentName::StockAnalyst);
}

#[tokio::test]
async fn blank_and_oversized_queries_are_rejected() {
    let orchestrator = orchestrator("general").with_limits(HistoryConfig {
        max_query_chars: 10,
        ..HistoryConfig::default()
    });

    assert!(matches!(
        orchestrator.submit("   ").await,
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        orchestrator.submit("this query is far too long").await,
        Err(CoreError::Validation(_))
    ));
    assert_eq!(
        orchestrator.statistics().await.expect("stats").total_queries,
        0
    );
}

#[tokio::test]
async fn history_validates_limits() {
    let orchestrator = orchestrator("general");
    for limit in [0, 501] {
        let filter = HistoryFilter::default().with_limit(limit);
        assert!(matches!(
            orchestrator.history(&filter).await,
            Err(CoreError::Validation(_))
        ));
    }

    let long_search = HistoryFilter::default().with_search("x".repeat(201));
    assert!(matches!(
        orchestrator.history(&long_search).await,
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test]
async fn history_and_statistics_reflect_submissions() {
    let orchestrator = orchestrator("market");
    for query in ["cheap laptop", "best laptop bag", "wireless mouse"] {
        orchestrator.submit(query).await.expect("submit");
    }

    let page = orchestrator
        .history(&orchestrator.default_filter().with_search("LAPTOP"))
        .await
        .expect("history");
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].query, "best laptop bag");

    let stats = orchestrator.statistics().await.expect("stats");
    assert_eq!(stats.total_queries, 3);
    assert_eq!(stats.queries_by_agent.get("Market Research Agent"), Some(&3));
}

#[tokio::test]
async fn delete_and_clear() {
    let orchestrator = orchestrator("general");
    let first = orchestrator.submit("one").await.expect("submit");
    orchestrator.submit("two").await.expect("submit");

    assert!(orchestrator.delete(first.id).await.expect("delete"));
    assert!(!orchestrator.delete(first.id).await.expect("delete again"));

    assert!(matches!(
        orchestrator.clear(false).await,
        Err(CoreError::Validation(message)) if message == "Set confirm=true to clear all history"
    ));
    assert_eq!(orchestrator.clear(true).await.expect("clear"), 1);
    assert_eq!(orchestrator.clear(true).await.expect("clear empty"), 0);
}

#[tokio::test]
async fn zero_id_is_rejected() {
    let orchestrator = orchestrator("general");
    assert!(matches!(
        orchestrator.get(QueryId(0)).await,
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test]
async fn store_failures_propagate() {
    let orchestrator = orchestrator_with(
        ChatModel::new(Arc::new(FixedLLM::new("general"))),
        Arc::new(UnavailableStore),
    );
    assert!(matches!(
        orchestrator.submit("hello").await,
        Err(CoreError::Store(StoreError::Unavailable(_)))
    ));
}
