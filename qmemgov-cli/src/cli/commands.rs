// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qmemctl", version, about = "Query memory governor console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Show the committed pool variables
    Show {
        /// Node settings file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// SQL LIKE pattern on the variable name
        #[arg(long)]
        like: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show pool statistics
    Stats {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Validate configuration changes against the node, e.g. minReservedMemorySize=1024
    Check {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(required = true)]
        changes: Vec<String>,
    },

    /// Simulate admission of queries with the given memory estimates
    ///
    /// Grants are held until every request has been decided.
    Admit {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(required = true)]
        sizes: Vec<u64>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Try to alter a pool variable on a live node
    Alter {
        #[arg(short, long)]
        config: PathBuf,

        key: String,

        value: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}
