// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! External key/value representation of limit configuration
//!
//! The configuration store hands the governor loosely typed values: JSON
//! booleans, integers, or strings holding either. [`RawConfig`] keeps them
//! as received and converts them into a [`LimitConfig`] on demand.

use crate::config::{ConfigError, ConfigKey, LimitConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Key/value configuration change as delivered by the configuration store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig {
    entries: BTreeMap<String, Value>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Raw form of an existing configuration
    pub fn from_limits(cfg: &LimitConfig) -> Self {
        Self::new()
            .with(
                ConfigKey::QueryUseMemoryPool.name(),
                u8::from(cfg.enabled),
            )
            .with(
                ConfigKey::MinReservedMemorySize.name(),
                cfg.min_reserved_bytes,
            )
            .with(
                ConfigKey::SingleQueryMaxMemorySize.name(),
                cfg.max_single_query_bytes,
            )
    }

    /// Overlay the entries onto `base`
    ///
    /// Keys absent from the change keep their value from `base`. Unknown keys,
    /// a key spelled twice with different case, and malformed values reject
    /// the whole change.
    pub fn apply_to(&self, base: LimitConfig) -> Result<LimitConfig, ConfigError> {
        let mut cfg = base;
        let mut seen = BTreeSet::new();
        for (name, value) in &self.entries {
            let key =
                ConfigKey::from_name(name).ok_or_else(|| ConfigError::UnknownKey(name.clone()))?;
            if !seen.insert(key) {
                return Err(ConfigError::DuplicateKey { key });
            }
            match key {
                ConfigKey::QueryUseMemoryPool => cfg.enabled = parse_switch(key, value)?,
                ConfigKey::MinReservedMemorySize => {
                    cfg.min_reserved_bytes = parse_bytes(key, value)?
                }
                ConfigKey::SingleQueryMaxMemorySize => {
                    cfg.max_single_query_bytes = parse_bytes(key, value)?
                }
            }
        }
        Ok(cfg)
    }
}

fn invalid(key: ConfigKey, value: &Value, reason: &str) -> ConfigError {
    let value = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    ConfigError::InvalidValue {
        key,
        value,
        reason: reason.to_string(),
    }
}

/// `0`/`1`, with `false`/`true` accepted as aliases
fn parse_switch(key: ConfigKey, value: &Value) -> Result<bool, ConfigError> {
    const REASON: &str = "expected 0 (disabled) or 1 (enabled)";
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid(key, value, REASON)),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(invalid(key, value, REASON)),
        },
        _ => Err(invalid(key, value, REASON)),
    }
}

/// Non-negative integer byte count
fn parse_bytes(key: ConfigKey, value: &Value) -> Result<u64, ConfigError> {
    const REASON: &str = "expected a non-negative integer byte count";
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| invalid(key, value, REASON)),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid(key, value, REASON)),
        _ => Err(invalid(key, value, REASON)),
    }
}
