// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Configuration error types

use crate::config::ConfigKey;
use thiserror::Error;

/// Configuration errors
///
/// Every variant is a refusal: the change that produced it was not applied and
/// the previously active configuration stays in force.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("minReservedMemorySize {requested} bytes exceeds node ceiling {ceiling} bytes")]
    ReserveTooLarge { requested: u64, ceiling: u64 },

    #[error("singleQueryMaxMemorySize {requested} bytes exceeds limit {limit} bytes")]
    SingleQueryLimitTooLarge { requested: u64, limit: u64 },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: ConfigKey,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("{key} is set more than once in the same change")]
    DuplicateKey { key: ConfigKey },

    #[error("{key} cannot be altered at runtime; change it through node configuration")]
    RuntimeAlterUnsupported { key: ConfigKey },

    #[error("Invalid variable pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

impl ConfigError {
    /// The configuration key the failure is attributed to, if any
    pub fn field(&self) -> Option<ConfigKey> {
        match self {
            ConfigError::ReserveTooLarge { .. } => Some(ConfigKey::MinReservedMemorySize),
            ConfigError::SingleQueryLimitTooLarge { .. } => {
                Some(ConfigKey::SingleQueryMaxMemorySize)
            }
            ConfigError::InvalidValue { key, .. } => Some(*key),
            ConfigError::RuntimeAlterUnsupported { key } | ConfigError::DuplicateKey { key } => {
                Some(*key)
            }
            ConfigError::UnknownKey(_)
            | ConfigError::InvalidPattern { .. }
            | ConfigError::Settings(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Settings(error.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Settings(error.to_string())
    }
}
