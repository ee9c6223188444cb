// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! qmemgov - Query memory governor for database nodes
//!
//! qmemgov decides, for each query a node is about to execute, whether the
//! query may take memory from the node's bounded query pool.
//!
//! # Features
//!
//! - **Admission control**: requests are granted or refused immediately
//!   against a per-query limit and a reserved floor
//! - **Scoped leases**: granted memory returns to the pool when the lease is
//!   dropped, on every exit path of the query
//! - **Live reconfiguration**: limits change without a restart; invalid
//!   changes are refused and the previous limits stay in force
//! - **Introspection**: committed limits as `(node, key, value)` rows and pool
//!   statistics
//!
//! # Usage
//!
//! ```ignore
//! use qmemgov::{GovernorService, NodeMemoryProfile, QueryId, RawConfig};
//!
//! let raw = RawConfig::new()
//!     .with("queryUseMemoryPool", 1)
//!     .with("minReservedMemorySize", 1024)
//!     .with("singleQueryMaxMemorySize", 100);
//! let governor = GovernorService::start(1, NodeMemoryProfile::with_capacity(1 << 30), &raw)?;
//!
//! let lease = governor.begin_query(QueryId(42), 64)?;
//! // ... execute ...
//! governor.end_query(lease);
//! ```

pub mod config;
pub mod governor;
pub mod pool;

pub use config::{
    ConfigError, ConfigKey, ConfigValidator, GovernorSettings, LimitConfig, NodeMemoryProfile,
    PoolSnapshot, RawConfig,
};
pub use governor::{ConfigListener, GovernorError, GovernorService, VariableRow};
pub use pool::{
    ConfigChange, LeaseId, LeaseInfo, LeaseState, MemoryPool, PoolError, PoolStats, QueryId,
    QueryMemoryLease,
};

/// qmemgov version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// qmemgov crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
