// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Configuration listener abstraction
//!
//! The configuration store is external to the governor. It only needs a way
//! to push changes and to read back what is in force, which this trait
//! provides.

use crate::config::{ConfigError, LimitConfig, RawConfig};
use crate::pool::ConfigChange;

/// Receiver of configuration changes propagated by a configuration store
pub trait ConfigListener: Send + Sync {
    /// Node the listener governs
    fn node_id(&self) -> u32;

    /// Apply a change
    ///
    /// # Returns
    /// * `Ok(change)` - The change was validated and is now in force
    /// * `Err(e)` - The change was refused; the previous configuration stays
    fn on_config_change(&self, change: &RawConfig) -> Result<ConfigChange, ConfigError>;

    /// The committed configuration
    fn active_config(&self) -> LimitConfig;
}
