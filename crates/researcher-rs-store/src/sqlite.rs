//! SQLite-backed query store.

use crate::{Claim, IdAllocator, QueryStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use researcher_rs_protocol::{
    AgentName, HistoryFilter, HistoryPage, NewQueryRecord, QueryId, QueryRecord, QueryStatistics,
};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS query_history (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    query_id INTEGER NOT NULL UNIQUE,
    query TEXT NOT NULL,
    agent TEXT NOT NULL,
    response TEXT NOT NULL,
    execution_time REAL NOT NULL,
    created_at_us INTEGER NOT NULL,
    adjustments TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_query_history_created
    ON query_history (created_at_us DESC, row_id DESC);
CREATE INDEX IF NOT EXISTS idx_query_history_agent
    ON query_history (agent);
";

const RECORD_COLUMNS: &str =
    "query_id, query, agent, response, execution_time, created_at_us, adjustments";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL function name for Unicode lowercasing; the built-in `lower()` only folds ASCII.
const UNICODE_LOWER: &str = "unicode_lower";

/// Query store over a single SQLite connection.
///
/// The connection is shared behind a mutex and every statement runs on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SqliteQueryStore {
    conn: Arc<Mutex<Connection>>,
    allocator: IdAllocator,
}

impl SqliteQueryStore {
    /// Open (or create) a database file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                StoreError::Unavailable(format!(
                    "failed to create store directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        info!("query store opened (path={})", path.display());
        Self::from_connection(conn)
    }

    /// Private in-memory database, discarded on drop.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        register_functions(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            allocator: IdAllocator::default(),
        })
    }

    /// Replace the id allocator (range and attempt cap).
    pub fn with_allocator(mut self, allocator: IdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            op(&mut guard)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("store task failed: {err}")))?
    }
}

#[async_trait]
impl QueryStore for SqliteQueryStore {
    async fn insert(&self, record: NewQueryRecord) -> Result<QueryRecord, StoreError> {
        let allocator = self.allocator;
        let adjustments = serde_json::to_string(&record.adjustments)?;
        self.run_blocking(move |conn| {
            let tx = conn.transaction()?;
            let latest: Option<i64> =
                tx.query_row("SELECT MAX(created_at_us) FROM query_history", [], |row| {
                    row.get(0)
                })?;
            // Never go behind the newest row so "newest first" follows insertion order.
            let created_at_us = Utc::now()
                .timestamp_micros()
                .max(latest.unwrap_or(i64::MIN));

            let id = allocator.allocate(|candidate| {
                let inserted = tx.execute(
                    "INSERT INTO query_history
                        (query_id, query, agent, response, execution_time, created_at_us, adjustments)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        candidate.get(),
                        record.query,
                        record.agent.as_str(),
                        record.response,
                        record.execution_time,
                        created_at_us,
                        adjustments,
                    ],
                );
                match inserted {
                    Ok(_) => Ok(Claim::Claimed),
                    Err(err) if is_unique_violation(&err) => Ok(Claim::Taken),
                    Err(err) => Err(err.into()),
                }
            })?;
            tx.commit()?;

            debug!(
                "query record inserted (id={id}, agent={})",
                record.agent.as_str()
            );
            Ok(QueryRecord {
                id,
                query: record.query,
                agent: record.agent,
                response: record.response,
                execution_time: record.execution_time,
                timestamp: timestamp_from_micros(created_at_us)?,
                adjustments: record.adjustments,
            })
        })
        .await
    }

    async fn get(&self, id: QueryId) -> Result<Option<QueryRecord>, StoreError> {
        self.run_blocking(move |conn| {
            let raw = conn
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM query_history WHERE query_id = ?1"),
                    params![id.get()],
                    RawRecord::from_row,
                )
                .optional()?;
            raw.map(RawRecord::into_record).transpose()
        })
        .await
    }

    async fn list(&self, filter: &HistoryFilter) -> Result<HistoryPage, StoreError> {
        let limit = filter.effective_limit();
        let offset = filter.offset;
        let (where_clause, args) = filter_clause(filter);
        self.run_blocking(move |conn| {
            let tx = conn.transaction()?;
            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM query_history{where_clause}"),
                params_from_iter(args.iter()),
                |row| row.get(0),
            )?;

            let mut window_args = args;
            window_args.push(SqlValue::Integer(to_sql_int(limit)));
            window_args.push(SqlValue::Integer(to_sql_int(offset)));
            let mut stmt = tx.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM query_history{where_clause}
                 ORDER BY created_at_us DESC, row_id DESC
                 LIMIT ? OFFSET ?"
            ))?;
            let items = stmt
                .query_map(params_from_iter(window_args.iter()), RawRecord::from_row)?
                .map(|raw| raw.map_err(StoreError::from).and_then(RawRecord::into_record))
                .collect::<Result<Vec<_>, _>>()?;
            drop(stmt);
            tx.commit()?;

            debug!(
                "history listed (total={total}, returned={}, offset={offset})",
                items.len()
            );
            Ok(HistoryPage {
                items,
                total: total.max(0) as u64,
            })
        })
        .await
    }

    async fn statistics(&self) -> Result<QueryStatistics, StoreError> {
        self.run_blocking(|conn| {
            let tx = conn.transaction()?;
            let (total, average): (i64, Option<f64>) = tx.query_row(
                "SELECT COUNT(*), AVG(execution_time) FROM query_history",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            if total == 0 {
                return Ok(QueryStatistics::empty());
            }

            let mut queries_by_agent = BTreeMap::new();
            let mut stmt =
                tx.prepare("SELECT agent, COUNT(*) FROM query_history GROUP BY agent")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (agent, count) = row?;
                queries_by_agent.insert(agent, count.max(0) as u64);
            }
            drop(stmt);

            let latest: Option<i64> = tx
                .query_row(
                    "SELECT created_at_us FROM query_history
                     ORDER BY created_at_us DESC, row_id DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            tx.commit()?;

            Ok(QueryStatistics {
                total_queries: total as u64,
                queries_by_agent,
                avg_execution_time: round_millis(average.unwrap_or(0.0)),
                last_query_time: latest.map(timestamp_from_micros).transpose()?,
            })
        })
        .await
    }

    async fn delete(&self, id: QueryId) -> Result<bool, StoreError> {
        self.run_blocking(move |conn| {
            let removed = conn.execute(
                "DELETE FROM query_history WHERE query_id = ?1",
                params![id.get()],
            )?;
            debug!("query record delete (id={id}, removed={removed})");
            Ok(removed > 0)
        })
        .await
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        self.run_blocking(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM query_history", [])?;
            tx.commit()?;
            info!("query history cleared (removed={removed})");
            Ok(removed as u64)
        })
        .await
    }
}

/// Row as stored, before validation.
struct RawRecord {
    query_id: i64,
    query: String,
    agent: String,
    response: String,
    execution_time: f64,
    created_at_us: i64,
    adjustments: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            query_id: row.get(0)?,
            query: row.get(1)?,
            agent: row.get(2)?,
            response: row.get(3)?,
            execution_time: row.get(4)?,
            created_at_us: row.get(5)?,
            adjustments: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<QueryRecord, StoreError> {
        let id = u32::try_from(self.query_id)
            .map_err(|_| StoreError::Corrupt(format!("query id out of range: {}", self.query_id)))?;
        let agent = self
            .agent
            .parse::<AgentName>()
            .map_err(|err| StoreError::Corrupt(format!("query {id}: {err}")))?;
        let adjustments = serde_json::from_str(&self.adjustments)
            .map_err(|err| StoreError::Corrupt(format!("query {id}: bad adjustments: {err}")))?;
        Ok(QueryRecord {
            id: QueryId(id),
            query: self.query,
            agent,
            response: self.response,
            execution_time: self.execution_time,
            timestamp: timestamp_from_micros(self.created_at_us)?,
            adjustments,
        })
    }
}

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

/// WHERE clause (with leading space) and its positional arguments.
fn filter_clause(filter: &HistoryFilter) -> (String, Vec<SqlValue>) {
    let mut conditions = Vec::new();
    let mut args = Vec::new();
    if let Some(agent) = filter.agent.as_deref() {
        conditions.push("agent = ?".to_string());
        args.push(SqlValue::Text(agent.to_string()));
    }
    if let Some(search) = filter.search_term() {
        conditions.push(format!("instr({UNICODE_LOWER}(query), ?) > 0"));
        args.push(SqlValue::Text(search.to_lowercase()));
    }
    if conditions.is_empty() {
        (String::new(), args)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), args)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn timestamp_from_micros(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {micros}")))
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn round_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
