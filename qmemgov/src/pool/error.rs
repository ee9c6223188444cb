// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Admission error types

use crate::pool::QueryId;
use thiserror::Error;

/// Admission refusals
///
/// A refused query holds no pool memory and must not start executing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("{query_id} requested {requested} bytes, single query limit is {limit} bytes")]
    SingleQueryLimitExceeded {
        query_id: QueryId,
        requested: u64,
        limit: u64,
    },

    #[error("{query_id} requested {requested} bytes, pool has {available} of {grantable} grantable bytes left")]
    PoolExhausted {
        query_id: QueryId,
        requested: u64,
        available: u64,
        grantable: u64,
    },
}
