// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Validation of proposed limit configurations

use crate::config::{ConfigError, LimitConfig, NodeMemoryProfile};

/// Point-in-time view of a pool that a proposal is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub profile: NodeMemoryProfile,
    pub allocated_bytes: u64,
}

impl PoolSnapshot {
    pub fn capacity_bytes(&self) -> u64 {
        self.profile.capacity_bytes
    }

    /// Bytes by which current grants exceed what `cfg` would allow
    ///
    /// `None` when the pool fits under `cfg` or `cfg` is disabled.
    pub fn over_commit(&self, cfg: &LimitConfig) -> Option<u64> {
        if !cfg.enabled {
            return None;
        }
        let grantable = cfg.grantable_bytes(self.capacity_bytes());
        self.allocated_bytes
            .checked_sub(grantable)
            .filter(|excess| *excess > 0)
    }
}

/// Stateless validator for [`LimitConfig`] proposals
///
/// Rules are evaluated in order and the first failure wins:
/// 1. the reserve must not exceed the node's reserve ceiling
/// 2. the single-query limit must fit in what the reserve leaves over
///
/// A disabled configuration is accepted as-is since its numeric fields are
/// inert. Such values are still committed, so the variables read path can
/// show a reserve or single-query limit that would be out of range once the
/// pool is enabled; enabling it re-runs both rules.
///
/// Validation has no side effects. Grants already outstanding are never
/// revoked, so a proposal that leaves the pool over-committed is accepted;
/// callers can detect that with [`PoolSnapshot::over_commit`].
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(
        proposed: LimitConfig,
        current: &PoolSnapshot,
    ) -> Result<LimitConfig, ConfigError> {
        if !proposed.enabled {
            return Ok(proposed);
        }

        let profile = &current.profile;
        let reserve_ceiling = profile.reserve_ceiling();
        if proposed.min_reserved_bytes > reserve_ceiling {
            return Err(ConfigError::ReserveTooLarge {
                requested: proposed.min_reserved_bytes,
                ceiling: reserve_ceiling,
            });
        }

        let single_limit = current
            .capacity_bytes()
            .saturating_sub(proposed.min_reserved_bytes)
            .min(profile.single_query_ceiling_bytes);
        if proposed.max_single_query_bytes > single_limit {
            return Err(ConfigError::SingleQueryLimitTooLarge {
                requested: proposed.max_single_query_bytes,
                limit: single_limit,
            });
        }

        Ok(proposed)
    }
}
