use crate::StoreError;
use async_trait::async_trait;
use researcher_rs_protocol::{
    HistoryFilter, HistoryPage, NewQueryRecord, QueryId, QueryRecord, QueryStatistics,
};

/// Persistent store for query/response records.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Persist a new record under a freshly allocated id.
    ///
    /// The store assigns the id and timestamp and returns the stored record.
    async fn insert(&self, record: NewQueryRecord) -> Result<QueryRecord, StoreError>;

    /// Fetch a record by id; a missing record is `Ok(None)`.
    async fn get(&self, id: QueryId) -> Result<Option<QueryRecord>, StoreError>;

    /// Matching records, newest first, windowed by the filter's offset and limit.
    async fn list(&self, filter: &HistoryFilter) -> Result<HistoryPage, StoreError>;

    async fn statistics(&self) -> Result<QueryStatistics, StoreError>;

    /// Remove one record; returns whether anything was removed.
    async fn delete(&self, id: QueryId) -> Result<bool, StoreError>;

    /// Remove every record atomically; returns how many were removed.
    async fn clear(&self) -> Result<u64, StoreError>;
}
