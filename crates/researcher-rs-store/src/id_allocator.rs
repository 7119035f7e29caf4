//! Random short-id allocation with a bounded number of attempts.

use crate::StoreError;
use log::{debug, warn};
use rand::Rng;
use researcher_rs_protocol::QueryId;

/// Lowest identifier handed out by default.
pub const ID_RANGE_START: u32 = 100;
/// Highest identifier handed out by default.
pub const ID_RANGE_END: u32 = 999;
/// Candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Outcome of trying to claim one candidate id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Claimed,
    Taken,
}

/// Draws identifiers uniformly from an inclusive range.
///
/// The allocator holds no state of its own: collision checks are delegated to
/// the caller through [`IdAllocator::allocate`], so the check and the write
/// can happen in a single atomic step against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    low: u32,
    high: u32,
    max_attempts: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            low: ID_RANGE_START,
            high: ID_RANGE_END,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator over `low..=high`; ids must stay positive.
    pub fn with_range(low: u32, high: u32) -> Result<Self, StoreError> {
        if low == 0 || low > high {
            return Err(StoreError::InvalidIdRange { low, high });
        }
        Ok(Self {
            low,
            high,
            ..Self::default()
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn range(&self) -> (u32, u32) {
        (self.low, self.high)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw one candidate without checking it.
    pub fn candidate(&self) -> QueryId {
        QueryId(rand::rng().random_range(self.low..=self.high))
    }

    /// Draw candidates until `try_claim` accepts one.
    ///
    /// Errors from `try_claim` abort immediately; running out of attempts
    /// yields [`StoreError::AllocationExhausted`].
    pub fn allocate<F>(&self, mut try_claim: F) -> Result<QueryId, StoreError>
    where
        F: FnMut(QueryId) -> Result<Claim, StoreError>,
    {
        for attempt in 1..=self.max_attempts {
            let id = self.candidate();
            match try_claim(id)? {
                Claim::Claimed => {
                    debug!("allocated query id (id={id}, attempt={attempt})");
                    return Ok(id);
                }
                Claim::Taken => debug!("query id collision (id={id}, attempt={attempt})"),
            }
        }
        warn!(
            "query id allocation exhausted (attempts={}, range={}..={})",
            self.max_attempts, self.low, self.high
        );
        Err(StoreError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}
