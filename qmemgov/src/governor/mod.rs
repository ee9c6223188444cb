// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Public face of the governor
//!
//! [`GovernorService`] is what the rest of a node talks to:
//! - the configuration store pushes changes through [`ConfigListener`]
//! - the query engine brackets execution with `begin_query` / `end_query`
//! - administrative commands read variables and are refused when they try to
//!   alter them live

pub mod error;
pub mod listener;
pub mod variables;

pub use error::GovernorError;
pub use listener::ConfigListener;
pub use variables::{LikePattern, VariableRow};

use crate::config::{
    ConfigError, ConfigKey, GovernorSettings, LimitConfig, NodeMemoryProfile, RawConfig,
};
use crate::pool::{
    ConfigChange, LeaseInfo, MemoryPool, PoolError, PoolStats, QueryId, QueryMemoryLease,
};
use std::sync::Arc;

/// Per-node memory governor
pub struct GovernorService {
    node_id: u32,
    pool: Arc<MemoryPool>,
}

impl GovernorService {
    /// Wrap an existing pool
    pub fn new(node_id: u32, pool: Arc<MemoryPool>) -> Self {
        Self { node_id, pool }
    }

    /// Start a governor from raw node configuration
    ///
    /// `raw` is overlaid on the defaults derived from `profile`. An invalid
    /// initial configuration refuses to start, the same way a node refuses
    /// to boot with out-of-range settings.
    pub fn start(
        node_id: u32,
        profile: NodeMemoryProfile,
        raw: &RawConfig,
    ) -> Result<Self, GovernorError> {
        let initial = raw.apply_to(LimitConfig::derived_default(&profile))?;
        let pool = MemoryPool::new(profile, initial).map_err(|e| {
            log::error!("Node {} memory governor failed to start: {}", node_id, e);
            e
        })?;
        Ok(Self::new(node_id, pool))
    }

    pub fn from_settings(settings: &GovernorSettings) -> Result<Self, GovernorError> {
        let profile = settings.resolve_profile()?;
        Self::start(settings.node_id, profile, &settings.limits)
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn pool(&self) -> &Arc<MemoryPool> {
        &self.pool
    }

    /// Apply a change delivered by the configuration store
    ///
    /// The change is merged onto the active configuration and validated as a
    /// whole. On failure nothing is applied and the error names the field.
    pub fn on_config_change(&self, raw: &RawConfig) -> Result<ConfigChange, ConfigError> {
        self.pool
            .reconfigure_with(|current| raw.apply_to(current))
            .map_err(|e| {
                log::warn!(
                    "Node {} refused configuration change on {}: {}",
                    self.node_id,
                    e.field().map_or("<none>", |key| key.name()),
                    e
                );
                e
            })
    }

    /// Admit a query before it does any work
    ///
    /// On error the query must abort without executing.
    pub fn begin_query(
        &self,
        query_id: QueryId,
        estimated_bytes: u64,
    ) -> Result<QueryMemoryLease, PoolError> {
        self.pool.acquire(query_id, estimated_bytes)
    }

    pub fn end_query(&self, lease: QueryMemoryLease) {
        self.pool.release(lease);
    }

    /// Run `execute` under an admitted lease
    ///
    /// `execute` is not called when admission fails. The lease is released on
    /// every exit path, including a panic unwinding out of `execute`.
    pub fn run_query<T, F>(
        &self,
        query_id: QueryId,
        estimated_bytes: u64,
        execute: F,
    ) -> Result<T, PoolError>
    where
        F: FnOnce(&QueryMemoryLease) -> T,
    {
        let lease = self.begin_query(query_id, estimated_bytes)?;
        let output = execute(&lease);
        self.end_query(lease);
        Ok(output)
    }

    /// Rows of the committed configuration, optionally filtered by a `LIKE`
    /// pattern on the key name
    pub fn show_variables(&self, like: Option<&str>) -> Result<Vec<VariableRow>, ConfigError> {
        let pattern = like.map(LikePattern::new).transpose()?;
        let cfg = self.pool.active_config();
        Ok(variables::collect_rows(self.node_id, &cfg, pattern.as_ref()))
    }

    /// Live administrative alteration of a pool key
    ///
    /// Always refused: pool limits only change through the configuration
    /// store.
    pub fn alter_variable(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key =
            ConfigKey::from_name(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        log::warn!(
            "Node {} refused live alteration of {} to '{}'",
            self.node_id,
            key,
            value
        );
        Err(ConfigError::RuntimeAlterUnsupported { key })
    }

    pub fn active_config(&self) -> LimitConfig {
        self.pool.active_config()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn active_leases(&self) -> Vec<LeaseInfo> {
        self.pool.active_leases()
    }
}

impl ConfigListener for GovernorService {
    fn node_id(&self) -> u32 {
        self.node_id
    }

    fn on_config_change(&self, change: &RawConfig) -> Result<ConfigChange, ConfigError> {
        GovernorService::on_config_change(self, change)
    }

    fn active_config(&self) -> LimitConfig {
        self.pool.active_config()
    }
}
