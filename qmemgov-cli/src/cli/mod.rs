// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for qmemctl
//!
//! Loads a node settings file, starts a governor from it and lets an
//! operator inspect the committed limits, try configuration changes and
//! simulate admission.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_admit, handle_alter, handle_check, handle_show, handle_stats};
