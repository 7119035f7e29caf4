//! Query history persistence.
//!
//! Records are written once and never updated; each receives a short numeric
//! id from [`IdAllocator`]. [`SqliteQueryStore`] is the production backend and
//! also runs fully in memory for tests.

mod error;
mod id_allocator;
mod sqlite;
mod store;

pub use error::StoreError;
pub use id_allocator::{Claim, DEFAULT_MAX_ATTEMPTS, ID_RANGE_END, ID_RANGE_START, IdAllocator};
pub use sqlite::SqliteQueryStore;
pub use store::QueryStore;
