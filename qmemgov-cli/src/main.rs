// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! qmemctl entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Can still be overridden by RUST_LOG
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "qmemctl".bold().green(), qmemgov::VERSION);
            println!("Query memory governor console");
            Ok(())
        }

        Commands::Show {
            config,
            like,
            format,
        } => cli::handle_show(config, like, format),

        Commands::Stats { config } => cli::handle_stats(config),

        Commands::Check { config, changes } => cli::handle_check(config, changes),

        Commands::Admit {
            config,
            sizes,
            format,
        } => cli::handle_admit(config, sizes, format),

        Commands::Alter { config, key, value } => cli::handle_alter(config, key, value),
    }
}
