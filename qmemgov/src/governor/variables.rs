// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Variable introspection rows and `LIKE` filtering

use crate::config::{ConfigError, ConfigKey, LimitConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One `(node, key, value)` row of the variables read path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRow {
    pub node_id: u32,
    pub key: String,
    pub value: String,
}

/// SQL `LIKE` pattern over variable names
///
/// `%` matches any run of characters and `_` exactly one. Matching is
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct LikePattern {
    regex: Regex,
}

impl LikePattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push_str("(?i)^");
        let mut literal = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '%' => expr.push_str(".*"),
                '_' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Rows for every key matching `pattern` (all keys when `None`)
pub fn collect_rows(
    node_id: u32,
    cfg: &LimitConfig,
    pattern: Option<&LikePattern>,
) -> Vec<VariableRow> {
    ConfigKey::ALL
        .into_iter()
        .filter(|key| pattern.map_or(true, |p| p.matches(key.name())))
        .map(|key| VariableRow {
            node_id,
            key: key.name().to_string(),
            value: cfg.value_of(key),
        })
        .collect()
}
