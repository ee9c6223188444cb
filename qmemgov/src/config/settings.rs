// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node settings file used to start a governor

use crate::config::{ConfigError, NodeMemoryProfile, RawConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Startup settings for one node's governor
///
/// ```json
/// {
///   "node_id": 1,
///   "total_memory_bytes": 8589934592,
///   "limits": { "queryUseMemoryPool": 1, "minReservedMemorySize": 1073741824 }
/// }
/// ```
///
/// Either `profile` or `total_memory_bytes` must be present; an explicit
/// profile wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorSettings {
    pub node_id: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<NodeMemoryProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_memory_bytes: Option<u64>,

    /// Initial limits, overlaid on the profile's derived defaults
    #[serde(default)]
    pub limits: RawConfig,
}

impl GovernorSettings {
    pub fn new(node_id: u32, profile: NodeMemoryProfile) -> Self {
        Self {
            node_id,
            profile: Some(profile),
            total_memory_bytes: None,
            limits: RawConfig::new(),
        }
    }

    pub fn with_limits(mut self, limits: RawConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Settings(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded governor settings from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Memory profile the pool will be built with
    pub fn resolve_profile(&self) -> Result<NodeMemoryProfile, ConfigError> {
        match (self.profile, self.total_memory_bytes) {
            (Some(profile), _) => Ok(profile),
            (None, Some(total)) => Ok(NodeMemoryProfile::from_total_memory(total)),
            (None, None) => Err(ConfigError::Settings(
                "either 'profile' or 'total_memory_bytes' is required".to_string(),
            )),
        }
    }
}
