// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memory pool limit configuration
//!
//! This module holds the immutable [`LimitConfig`] snapshot that governs
//! admission, the node-wide [`NodeMemoryProfile`] it is validated against,
//! and the parsing of the external key/value representation used by the
//! configuration store.

pub mod error;
pub mod raw;
pub mod settings;
pub mod validator;

pub use error::ConfigError;
pub use raw::RawConfig;
pub use settings::GovernorSettings;
pub use validator::{ConfigValidator, PoolSnapshot};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Share of pool capacity reserved when no explicit reserve is configured
pub const DEFAULT_RESERVE_PERCENT: u64 = 20;

/// Lower bound for the derived default reserve
pub const MIN_DEFAULT_RESERVE_BYTES: u64 = 512 * MIB;

/// Externally settable configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigKey {
    /// `queryUseMemoryPool`: 0 disables admission control, 1 enables it
    QueryUseMemoryPool,
    /// `minReservedMemorySize`: bytes that must stay unallocated
    MinReservedMemorySize,
    /// `singleQueryMaxMemorySize`: largest grant a single query may receive
    SingleQueryMaxMemorySize,
}

impl ConfigKey {
    /// All keys, in the order they are reported by the read path
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::QueryUseMemoryPool,
        ConfigKey::MinReservedMemorySize,
        ConfigKey::SingleQueryMaxMemorySize,
    ];

    /// External key name
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::QueryUseMemoryPool => "queryUseMemoryPool",
            ConfigKey::MinReservedMemorySize => "minReservedMemorySize",
            ConfigKey::SingleQueryMaxMemorySize => "singleQueryMaxMemorySize",
        }
    }

    /// Look up a key by its external name (case-insensitive)
    pub fn from_name(name: &str) -> Option<ConfigKey> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable snapshot of the governing parameters
///
/// A `LimitConfig` is never edited in place by the pool: every
/// reconfiguration builds a new value and swaps it in as a unit, so readers
/// always see the three fields together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Whether admission control is applied at all
    pub enabled: bool,

    /// Bytes of pool capacity that must remain unallocated
    pub min_reserved_bytes: u64,

    /// Largest grant a single query may receive
    pub max_single_query_bytes: u64,
}

impl LimitConfig {
    pub fn new(enabled: bool, min_reserved_bytes: u64, max_single_query_bytes: u64) -> Self {
        Self {
            enabled,
            min_reserved_bytes,
            max_single_query_bytes,
        }
    }

    /// Configuration with admission control switched off
    pub fn disabled() -> Self {
        Self::new(false, 0, 0)
    }

    /// Default limits derived from the node's memory profile
    ///
    /// The reserve is 20% of capacity rounded down to whole MiB, but never
    /// below 512 MiB and never above the capacity itself. The single-query
    /// limit is whatever remains.
    pub fn derived_default(profile: &NodeMemoryProfile) -> Self {
        let capacity = profile.capacity_bytes;
        let percent = capacity / 100 * DEFAULT_RESERVE_PERCENT / MIB * MIB;
        let reserve = percent
            .max(MIN_DEFAULT_RESERVE_BYTES)
            .min(profile.reserve_ceiling());
        let single = capacity
            .saturating_sub(reserve)
            .min(profile.single_query_ceiling_bytes);

        Self::new(true, reserve, single)
    }

    /// Rendered value of a key, as shown by the read path
    pub fn value_of(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::QueryUseMemoryPool => u8::from(self.enabled).to_string(),
            ConfigKey::MinReservedMemorySize => self.min_reserved_bytes.to_string(),
            ConfigKey::SingleQueryMaxMemorySize => self.max_single_query_bytes.to_string(),
        }
    }

    /// Bytes available for query grants under this configuration
    pub fn grantable_bytes(&self, capacity_bytes: u64) -> u64 {
        capacity_bytes.saturating_sub(self.min_reserved_bytes)
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Display for LimitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} {}={} {}={}",
            ConfigKey::QueryUseMemoryPool,
            u8::from(self.enabled),
            ConfigKey::MinReservedMemorySize,
            self.min_reserved_bytes,
            ConfigKey::SingleQueryMaxMemorySize,
            self.max_single_query_bytes
        )
    }
}

/// Node-wide memory figures that bound every [`LimitConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMemoryProfile {
    /// Physical memory of the node
    pub total_memory_bytes: u64,

    /// Total bytes the query pool may account for
    pub capacity_bytes: u64,

    /// Largest accepted `minReservedMemorySize`
    pub reserve_ceiling_bytes: u64,

    /// Largest accepted `singleQueryMaxMemorySize`
    pub single_query_ceiling_bytes: u64,
}

impl NodeMemoryProfile {
    /// Profile whose pool spans exactly `capacity_bytes`, with both ceilings
    /// equal to the capacity
    pub fn with_capacity(capacity_bytes: u64) -> Self {
        Self {
            total_memory_bytes: capacity_bytes,
            capacity_bytes,
            reserve_ceiling_bytes: capacity_bytes,
            single_query_ceiling_bytes: capacity_bytes,
        }
    }

    /// Derive a profile from the node's physical memory
    ///
    /// Capacity is rounded down to whole MiB.
    pub fn from_total_memory(total_memory_bytes: u64) -> Self {
        let capacity_bytes = total_memory_bytes / MIB * MIB;
        Self {
            total_memory_bytes,
            ..Self::with_capacity(capacity_bytes)
        }
    }

    /// Effective reserve ceiling; a reserve can never exceed the capacity
    pub fn reserve_ceiling(&self) -> u64 {
        self.reserve_ceiling_bytes.min(self.capacity_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_name(key.name()), Some(key));
        }
        assert_eq!(
            ConfigKey::from_name("QUERYUSEMEMORYPOOL"),
            Some(ConfigKey::QueryUseMemoryPool)
        );
        assert_eq!(ConfigKey::from_name("supportVnodes"), None);
    }

    #[test]
    fn test_value_rendering() {
        let cfg = LimitConfig::new(true, 1024, 100);
        assert_eq!(cfg.value_of(ConfigKey::QueryUseMemoryPool), "1");
        assert_eq!(cfg.value_of(ConfigKey::MinReservedMemorySize), "1024");
        assert_eq!(cfg.value_of(ConfigKey::SingleQueryMaxMemorySize), "100");
        assert_eq!(LimitConfig::disabled().value_of(ConfigKey::QueryUseMemoryPool), "0");
    }

    #[test]
    fn test_derived_default_small_node_uses_minimum_reserve() {
        // 2 GiB: 20% is ~409 MiB, below the 512 MiB floor
        let profile = NodeMemoryProfile::from_total_memory(2048 * MIB);
        let cfg = LimitConfig::derived_default(&profile);

        assert!(cfg.enabled);
        assert_eq!(cfg.min_reserved_bytes, MIN_DEFAULT_RESERVE_BYTES);
        assert_eq!(cfg.max_single_query_bytes, 1536 * MIB);
    }

    #[test]
    fn test_derived_default_large_node_uses_percentage() {
        let profile = NodeMemoryProfile::from_total_memory(10_000 * MIB);
        let cfg = LimitConfig::derived_default(&profile);

        assert_eq!(cfg.min_reserved_bytes, 2000 * MIB);
        assert_eq!(cfg.min_reserved_bytes % MIB, 0);
        assert_eq!(
            cfg.min_reserved_bytes + cfg.max_single_query_bytes,
            profile.capacity_bytes
        );
    }

    #[test]
    fn test_derived_default_tiny_pool_caps_reserve_at_capacity() {
        let profile = NodeMemoryProfile::with_capacity(4096);
        let cfg = LimitConfig::derived_default(&profile);

        assert_eq!(cfg.min_reserved_bytes, 4096);
        assert_eq!(cfg.max_single_query_bytes, 0);
    }

    #[test]
    fn test_profile_rounds_capacity_to_mib() {
        let profile = NodeMemoryProfile::from_total_memory(3 * MIB + 12345);
        assert_eq!(profile.total_memory_bytes, 3 * MIB + 12345);
        assert_eq!(profile.capacity_bytes, 3 * MIB);
        assert_eq!(profile.reserve_ceiling(), 3 * MIB);
    }
}
