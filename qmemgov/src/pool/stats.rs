// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pool statistics for diagnostics

use crate::pool::{LeaseId, QueryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time pool statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Whether admission control is active
    pub enabled: bool,

    /// Total pool capacity in bytes
    pub capacity_bytes: u64,

    /// Reserved floor in bytes
    pub reserved_bytes: u64,

    /// Bytes currently held by active leases
    pub allocated_bytes: u64,

    /// Bytes still grantable under the active limits
    pub available_bytes: u64,

    /// Highest `allocated_bytes` observed
    pub peak_bytes: u64,

    pub active_leases: usize,

    /// Leases granted since startup
    pub granted_total: u64,

    /// Requests refused since startup
    pub rejected_total: u64,

    /// Double releases and accounting underflows detected
    pub accounting_violations: u64,

    /// Version of the active configuration, starting at 1
    pub config_version: u64,
}

impl PoolStats {
    /// Fraction of grantable memory in use
    pub fn usage_ratio(&self) -> f64 {
        let grantable = self.capacity_bytes.saturating_sub(self.reserved_bytes);
        if grantable == 0 {
            return 0.0;
        }
        self.allocated_bytes as f64 / grantable as f64
    }

    /// Format as human-readable string
    pub fn format_human_readable(&self) -> String {
        format!(
            "Pool[{}]: {}/{} ({:.1}%), Reserved: {}, Peak: {}, Leases: {}",
            if self.enabled { "on" } else { "off" },
            Self::format_bytes(self.allocated_bytes),
            Self::format_bytes(self.capacity_bytes.saturating_sub(self.reserved_bytes)),
            self.usage_ratio() * 100.0,
            Self::format_bytes(self.reserved_bytes),
            Self::format_bytes(self.peak_bytes),
            self.active_leases
        )
    }

    /// Format bytes as human-readable (KB, MB, GB)
    pub fn format_bytes(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.2}GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2}MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2}KB", bytes as f64 / KB as f64)
        } else {
            format!("{}B", bytes)
        }
    }
}

/// An outstanding grant, as listed for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInfo {
    pub lease_id: LeaseId,
    pub query_id: QueryId,
    pub granted_bytes: u64,
    pub granted_at: DateTime<Utc>,
}
