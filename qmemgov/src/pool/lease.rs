// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Scoped memory grants held by executing queries

use crate::pool::MemoryPool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of the query a grant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(pub u64);

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QID:0x{:x}", self.0)
    }
}

/// Pool-unique identifier of a single grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseId(pub u64);

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lease#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseState {
    Active,
    Released,
}

/// Memory granted to one query
///
/// The lease is the only handle to its grant: it is neither `Clone` nor
/// `Copy`, and dropping it returns the memory to the pool. An explicit
/// [`release`](Self::release) or [`MemoryPool::release`] does the same
/// thing earlier; whichever happens first wins and the drop becomes a no-op.
pub struct QueryMemoryLease {
    pool: Arc<MemoryPool>,
    lease_id: LeaseId,
    query_id: QueryId,
    granted_bytes: u64,
    state: LeaseState,
}

impl QueryMemoryLease {
    pub(crate) fn new(
        pool: Arc<MemoryPool>,
        lease_id: LeaseId,
        query_id: QueryId,
        granted_bytes: u64,
    ) -> Self {
        Self {
            pool,
            lease_id,
            query_id,
            granted_bytes,
            state: LeaseState::Active,
        }
    }

    pub fn query_id(&self) -> QueryId {
        self.query_id
    }

    pub fn lease_id(&self) -> LeaseId {
        self.lease_id
    }

    pub fn granted_bytes(&self) -> u64 {
        self.granted_bytes
    }

    pub fn state(&self) -> LeaseState {
        self.state
    }

    /// Return the grant to the pool now
    pub fn release(mut self) {
        self.finish();
    }

    pub(crate) fn finish(&mut self) {
        if self.state == LeaseState::Active {
            self.state = LeaseState::Released;
            self.pool.release_grant(self.lease_id, self.granted_bytes);
        }
    }
}

impl Drop for QueryMemoryLease {
    fn drop(&mut self) {
        if self.state == LeaseState::Active {
            log::debug!(
                "{} {} released on drop ({} bytes)",
                self.query_id,
                self.lease_id,
                self.granted_bytes
            );
        }
        self.finish();
    }
}

impl fmt::Debug for QueryMemoryLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryMemoryLease")
            .field("lease_id", &self.lease_id)
            .field("query_id", &self.query_id)
            .field("granted_bytes", &self.granted_bytes)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitConfig, NodeMemoryProfile};

    fn pool() -> Arc<MemoryPool> {
        MemoryPool::new(
            NodeMemoryProfile::with_capacity(10_000),
            LimitConfig::new(true, 1_000, 5_000),
        )
        .unwrap()
    }

    #[test]
    fn test_query_id_display() {
        assert_eq!(QueryId(255).to_string(), "QID:0xff");
    }

    #[test]
    fn test_drop_returns_memory() {
        let pool = pool();
        {
            let lease = pool.acquire(QueryId(1), 4_000).unwrap();
            assert_eq!(lease.state(), LeaseState::Active);
            assert_eq!(pool.allocated(), 4_000);
        }
        assert_eq!(pool.allocated(), 0);
        assert_eq!(pool.stats().active_leases, 0);
    }

    #[test]
    fn test_explicit_release_then_drop_releases_once() {
        let pool = pool();
        let first = pool.acquire(QueryId(1), 3_000).unwrap();
        let second = pool.acquire(QueryId(2), 2_000).unwrap();

        first.release();
        assert_eq!(pool.allocated(), 2_000);

        drop(second);
        assert_eq!(pool.allocated(), 0);
        assert_eq!(pool.stats().accounting_violations, 0);
    }

    #[test]
    fn test_released_on_unwind() {
        let pool = pool();
        let worker_pool = Arc::clone(&pool);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _lease = worker_pool.acquire(QueryId(9), 4_500).unwrap();
            panic!("operator failed");
        }));

        assert!(outcome.is_err());
        assert_eq!(pool.allocated(), 0);
    }

    #[test]
    fn test_debug_shows_grant() {
        let pool = pool();
        let lease = pool.acquire(QueryId(7), 10).unwrap();
        let rendered = format!("{:?}", lease);

        assert!(rendered.contains("granted_bytes: 10"));
        assert!(rendered.contains("Active"));
    }
}
