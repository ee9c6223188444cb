// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Governor error types

use crate::config::ConfigError;
use crate::pool::PoolError;
use thiserror::Error;

/// Errors surfaced by [`GovernorService`](crate::governor::GovernorService)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Admission error: {0}")]
    Admission(#[from] PoolError),
}
