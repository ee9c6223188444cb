// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers for qmemctl

use super::commands::OutputFormat;
use super::output::{AdmissionRow, ResultFormatter};
use colored::*;
use qmemgov::{GovernorService, GovernorSettings, QueryId, RawConfig};
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn start_governor(config: &Path) -> Result<GovernorService, Box<dyn std::error::Error>> {
    let settings = GovernorSettings::load(config)?;
    match GovernorService::from_settings(&settings) {
        Ok(governor) => {
            log::info!(
                "Started governor for node {} ({})",
                governor.node_id(),
                governor.active_config()
            );
            Ok(governor)
        }
        Err(e) => {
            eprintln!("{} Node {} failed to start", "✗".red(), settings.node_id);
            Err(e.into())
        }
    }
}

/// Parse `key=value` into a change, keeping numbers as numbers
fn parse_change(change: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = change
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got '{}'", change))?;
    let value = value.trim();
    let json = match value.parse::<u64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::from(value),
    };
    Ok((key.trim().to_string(), json))
}

pub fn handle_show(config: PathBuf, like: Option<String>, format: OutputFormat) -> CliResult {
    let governor = start_governor(&config)?;
    let rows = governor.show_variables(like.as_deref())?;
    print!("{}", ResultFormatter::format_variables(&rows, format));
    Ok(())
}

pub fn handle_stats(config: PathBuf) -> CliResult {
    let governor = start_governor(&config)?;
    println!("{} {}", "Node:".bold(), governor.node_id());
    println!("{} {}", "Limits:".bold(), governor.active_config());
    print!("{}", ResultFormatter::format_stats(&governor.stats()));
    Ok(())
}

pub fn handle_check(config: PathBuf, changes: Vec<String>) -> CliResult {
    let governor = start_governor(&config)?;

    let mut raw = RawConfig::new();
    for change in &changes {
        let (key, value) = parse_change(change)?;
        raw.set(key, value);
    }

    match governor.on_config_change(&raw) {
        Ok(change) => {
            if change.is_noop() {
                println!("{} No effective change", "✓".green());
            } else {
                println!("{} Change accepted", "✓".green());
            }
            println!("  {} {}", "before:".dimmed(), change.previous);
            println!("  {} {}", "after: ".dimmed(), change.current);
            Ok(())
        }
        Err(e) => {
            let field = e.field().map_or("<none>", |key| key.name());
            println!("{} Change refused on {}", "✗".red(), field.bold());
            println!("  {}", e);
            println!("  {} {}", "kept:".dimmed(), governor.active_config());
            Err(e.into())
        }
    }
}

pub fn handle_admit(config: PathBuf, sizes: Vec<u64>, format: OutputFormat) -> CliResult {
    let governor = start_governor(&config)?;

    // Leases stay alive until the loop is done so later requests see them.
    let mut leases = Vec::with_capacity(sizes.len());
    let mut rows = Vec::with_capacity(sizes.len());
    for (i, size) in sizes.iter().enumerate() {
        let query_id = QueryId(i as u64 + 1);
        let outcome = governor.begin_query(query_id, *size).map(|lease| {
            leases.push(lease);
        });
        rows.push(AdmissionRow {
            query: query_id.to_string(),
            requested: *size,
            outcome,
        });
    }

    print!("{}", ResultFormatter::format_admissions(&rows, format));
    if format == OutputFormat::Table {
        print!("{}", ResultFormatter::format_stats(&governor.stats()));
    }

    for lease in leases {
        governor.end_query(lease);
    }
    Ok(())
}

pub fn handle_alter(config: PathBuf, key: String, value: String) -> CliResult {
    let governor = start_governor(&config)?;
    governor.alter_variable(&key, &value).map_err(|e| {
        println!("{} {}", "✗".red(), e);
        e
    })?;
    Ok(())
}
