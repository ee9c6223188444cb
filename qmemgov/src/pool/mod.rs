// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query memory pool with admission control
//!
//! The pool accounts for memory granted to executing queries and decides, at
//! the moment a query asks, whether the request fits under the active
//! [`LimitConfig`]. Admission never waits: a request is granted or refused
//! immediately and the caller decides whether to retry.
//!
//! All mutation (`acquire`, release, `reconfigure`) goes through one mutex
//! per pool. Each critical section is a few arithmetic steps and a hash map
//! update, so contention stays short.

pub mod error;
pub mod lease;
pub mod stats;

pub use error::PoolError;
pub use lease::{LeaseId, LeaseState, QueryId, QueryMemoryLease};
pub use stats::{LeaseInfo, PoolStats};

use crate::config::{ConfigError, ConfigValidator, LimitConfig, NodeMemoryProfile, PoolSnapshot};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a committed reconfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigChange {
    pub previous: LimitConfig,
    pub current: LimitConfig,
    pub version: u64,
    pub applied_at: DateTime<Utc>,
}

impl ConfigChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

#[derive(Debug, Clone, Copy)]
struct Grant {
    query_id: QueryId,
    bytes: u64,
    granted_at: DateTime<Utc>,
}

#[derive(Debug)]
struct PoolState {
    config: LimitConfig,
    config_version: u64,
    config_applied_at: DateTime<Utc>,
    // Wider than any single grant so a disabled pool can hold grants summing
    // past u64::MAX without losing bytes.
    allocated: u128,
    peak: u128,
    leases: HashMap<LeaseId, Grant>,
    next_lease_id: u64,
    granted_total: u64,
    rejected_total: u64,
    violations: u64,
}

impl PoolState {
    fn grant(&mut self, query_id: QueryId, bytes: u64) -> LeaseId {
        let lease_id = LeaseId(self.next_lease_id);
        self.next_lease_id += 1;

        self.allocated += u128::from(bytes);
        self.peak = self.peak.max(self.allocated);
        self.granted_total += 1;
        self.leases.insert(
            lease_id,
            Grant {
                query_id,
                bytes,
                granted_at: Utc::now(),
            },
        );
        lease_id
    }

    /// Allocation as reported through the public API
    fn allocated_bytes(&self) -> u64 {
        u64::try_from(self.allocated).unwrap_or(u64::MAX)
    }
}

/// Per-node query memory pool
///
/// Created once at node startup and reconfigured in place for the lifetime
/// of the process. Leases hold an `Arc` back to the pool, so the pool is
/// always handed out as `Arc<MemoryPool>`.
pub struct MemoryPool {
    profile: NodeMemoryProfile,
    state: Mutex<PoolState>,
}

impl std::fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryPool")
            .field("capacity", &self.profile.capacity_bytes)
            .field("config", &state.config)
            .field("allocated", &state.allocated)
            .field("leases", &state.leases.len())
            .finish()
    }
}

impl MemoryPool {
    /// Create a pool with a validated initial configuration
    pub fn new(profile: NodeMemoryProfile, initial: LimitConfig) -> Result<Arc<Self>, ConfigError> {
        let snapshot = PoolSnapshot {
            profile,
            allocated_bytes: 0,
        };
        let config = ConfigValidator::validate(initial, &snapshot)?;

        log::info!(
            "Query memory pool created: capacity {} bytes, {}",
            profile.capacity_bytes,
            config
        );

        Ok(Arc::new(Self {
            profile,
            state: Mutex::new(PoolState {
                config,
                config_version: 1,
                config_applied_at: Utc::now(),
                allocated: 0,
                peak: 0,
                leases: HashMap::new(),
                next_lease_id: 1,
                granted_total: 0,
                rejected_total: 0,
                violations: 0,
            }),
        }))
    }

    /// The committed configuration
    pub fn active_config(&self) -> LimitConfig {
        self.state.lock().config
    }

    pub fn config_version(&self) -> u64 {
        self.state.lock().config_version
    }

    /// Bytes currently held by leases, saturating at `u64::MAX`
    pub fn allocated(&self) -> u64 {
        self.state.lock().allocated_bytes()
    }

    /// Validate and commit a new configuration
    ///
    /// Outstanding leases keep what they were granted; only later `acquire`
    /// calls see the new limits. A rejected configuration leaves the pool
    /// untouched.
    pub fn reconfigure(&self, cfg: LimitConfig) -> Result<ConfigChange, ConfigError> {
        self.reconfigure_with(|_| Ok(cfg))
    }

    /// Derive, validate and commit a configuration from the active one
    ///
    /// `derive` runs under the pool lock, so concurrent partial changes are
    /// merged onto the configuration actually in force.
    pub fn reconfigure_with<F>(&self, derive: F) -> Result<ConfigChange, ConfigError>
    where
        F: FnOnce(LimitConfig) -> Result<LimitConfig, ConfigError>,
    {
        let mut state = self.state.lock();
        let previous = state.config;
        let snapshot = PoolSnapshot {
            profile: self.profile,
            allocated_bytes: state.allocated_bytes(),
        };

        let validated = derive(previous)
            .and_then(|proposed| ConfigValidator::validate(proposed, &snapshot));
        let current = match validated {
            Ok(cfg) => cfg,
            Err(e) => {
                drop(state);
                log::warn!("Rejected memory pool configuration: {}", e);
                return Err(e);
            }
        };

        state.config = current;
        state.config_version += 1;
        state.config_applied_at = Utc::now();
        let change = ConfigChange {
            previous,
            current,
            version: state.config_version,
            applied_at: state.config_applied_at,
        };
        drop(state);

        log::info!(
            "Memory pool reconfigured (v{}): {} -> {}",
            change.version,
            previous,
            current
        );
        // Outstanding grants are never revoked; new requests are refused until
        // enough leases drain.
        if let Some(excess) = snapshot.over_commit(&current) {
            log::warn!(
                "Memory pool over-committed by {} bytes under {}",
                excess,
                current
            );
        }
        Ok(change)
    }

    /// Admit a query's memory request
    ///
    /// With the pool disabled every request is granted and only recorded.
    /// With it enabled the request must not exceed the single-query limit
    /// and must fit in capacity minus the reserved floor. Zero-byte requests
    /// are always granted.
    pub fn acquire(
        self: &Arc<Self>,
        query_id: QueryId,
        requested: u64,
    ) -> Result<QueryMemoryLease, PoolError> {
        let mut state = self.state.lock();
        let cfg = state.config;

        if cfg.enabled && requested > 0 {
            let refusal = if requested > cfg.max_single_query_bytes {
                Some(PoolError::SingleQueryLimitExceeded {
                    query_id,
                    requested,
                    limit: cfg.max_single_query_bytes,
                })
            } else {
                let grantable = cfg.grantable_bytes(self.profile.capacity_bytes);
                let available = grantable.saturating_sub(state.allocated_bytes());
                if requested > available {
                    Some(PoolError::PoolExhausted {
                        query_id,
                        requested,
                        available,
                        grantable,
                    })
                } else {
                    None
                }
            };

            if let Some(err) = refusal {
                state.rejected_total += 1;
                drop(state);
                log::warn!("Memory admission refused: {}", err);
                return Err(err);
            }
        }

        let lease_id = state.grant(query_id, requested);
        let allocated = state.allocated;
        drop(state);

        log::debug!(
            "{} granted {} bytes as {} (pool allocated {} bytes)",
            query_id,
            requested,
            lease_id,
            allocated
        );
        Ok(QueryMemoryLease::new(
            Arc::clone(self),
            lease_id,
            query_id,
            requested,
        ))
    }

    /// Return a lease's memory to the pool
    pub fn release(&self, lease: QueryMemoryLease) {
        lease.release();
    }

    /// Settle one grant
    ///
    /// Returns `false` when the grant was unknown (already released) or the
    /// accounting would have gone negative. Both are counted as violations;
    /// allocation is clamped at zero rather than underflowing.
    pub(crate) fn release_grant(&self, lease_id: LeaseId, bytes: u64) -> bool {
        let mut state = self.state.lock();

        let Some(grant) = state.leases.remove(&lease_id) else {
            state.violations += 1;
            drop(state);
            log::error!(
                "Accounting violation: {} released more than once ({} bytes)",
                lease_id,
                bytes
            );
            return false;
        };

        match state.allocated.checked_sub(u128::from(grant.bytes)) {
            Some(remaining) => {
                state.allocated = remaining;
                drop(state);
                log::debug!(
                    "{} released {} bytes ({})",
                    grant.query_id,
                    grant.bytes,
                    lease_id
                );
                true
            }
            None => {
                let allocated = state.allocated;
                state.allocated = 0;
                state.violations += 1;
                drop(state);
                log::error!(
                    "Accounting violation: releasing {} bytes for {} with only {} allocated",
                    grant.bytes,
                    grant.query_id,
                    allocated
                );
                false
            }
        }
    }

    /// Outstanding grants, oldest first
    pub fn active_leases(&self) -> Vec<LeaseInfo> {
        let state = self.state.lock();
        let mut leases: Vec<LeaseInfo> = state
            .leases
            .iter()
            .map(|(lease_id, grant)| LeaseInfo {
                lease_id: *lease_id,
                query_id: grant.query_id,
                granted_bytes: grant.bytes,
                granted_at: grant.granted_at,
            })
            .collect();
        leases.sort_by_key(|info| info.lease_id);
        leases
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let reserved = if state.config.enabled {
            state.config.min_reserved_bytes
        } else {
            0
        };
        let grantable = self.profile.capacity_bytes.saturating_sub(reserved);

        let allocated = state.allocated_bytes();

        PoolStats {
            enabled: state.config.enabled,
            capacity_bytes: self.profile.capacity_bytes,
            reserved_bytes: reserved,
            allocated_bytes: allocated,
            available_bytes: grantable.saturating_sub(allocated),
            peak_bytes: u64::try_from(state.peak).unwrap_or(u64::MAX),
            active_leases: state.leases.len(),
            granted_total: state.granted_total,
            rejected_total: state.rejected_total,
            accounting_violations: state.violations,
            config_version: state.config_version,
        }
    }
}
