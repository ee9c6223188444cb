// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use qmemgov::{PoolError, PoolStats, VariableRow};

/// Outcome of one simulated admission
pub struct AdmissionRow {
    pub query: String,
    pub requested: u64,
    pub outcome: Result<(), PoolError>,
}

impl AdmissionRow {
    fn outcome_text(&self) -> String {
        match &self.outcome {
            Ok(()) => "granted".to_string(),
            Err(PoolError::SingleQueryLimitExceeded { .. }) => "single query limit".to_string(),
            Err(PoolError::PoolExhausted { .. }) => "pool exhausted".to_string(),
        }
    }
}

pub struct ResultFormatter;

impl ResultFormatter {
    pub fn format_variables(rows: &[VariableRow], format: OutputFormat) -> String {
        let header = ["node_id", "key", "value"];
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| vec![row.node_id.to_string(), row.key.clone(), row.value.clone()])
            .collect();

        match format {
            OutputFormat::Table => Self::format_table("Variables", &header, &cells),
            OutputFormat::Json => serde_json::to_string_pretty(rows).unwrap_or_else(|_| {
                "{\"status\": \"error\", \"error\": \"Could not serialize variables\"}".to_string()
            }),
            OutputFormat::Csv => Self::format_csv(&header, &cells),
        }
    }

    pub fn format_admissions(rows: &[AdmissionRow], format: OutputFormat) -> String {
        let header = ["query", "requested", "outcome"];
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| vec![row.query.clone(), row.requested.to_string(), row.outcome_text()])
            .collect();

        match format {
            OutputFormat::Table => Self::format_table("Admission", &header, &cells),
            OutputFormat::Json => {
                let json_rows: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|row| {
                        serde_json::json!({
                            "query": row.query,
                            "requested": row.requested,
                            "granted": row.outcome.is_ok(),
                            "error": row.outcome.as_ref().err().map(|e| e.to_string()),
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&json_rows).unwrap_or_default()
            }
            OutputFormat::Csv => Self::format_csv(&header, &cells),
        }
    }

    pub fn format_stats(stats: &PoolStats) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("metric").fg(Color::Green),
            Cell::new("value").fg(Color::Green),
        ]);

        let fmt = PoolStats::format_bytes;
        table.add_row(vec!["enabled".to_string(), stats.enabled.to_string()]);
        table.add_row(vec!["capacity".to_string(), fmt(stats.capacity_bytes)]);
        table.add_row(vec!["reserved".to_string(), fmt(stats.reserved_bytes)]);
        table.add_row(vec!["allocated".to_string(), fmt(stats.allocated_bytes)]);
        table.add_row(vec!["available".to_string(), fmt(stats.available_bytes)]);
        table.add_row(vec!["peak".to_string(), fmt(stats.peak_bytes)]);
        table.add_row(vec!["active leases".to_string(), stats.active_leases.to_string()]);
        table.add_row(vec!["granted".to_string(), stats.granted_total.to_string()]);
        table.add_row(vec!["rejected".to_string(), stats.rejected_total.to_string()]);
        table.add_row(vec!["config version".to_string(), stats.config_version.to_string()]);

        format!(
            "{}\n{}\n{}\n",
            "Pool Statistics".bold().green(),
            stats.format_human_readable(),
            table
        )
    }

    fn format_table(title: &str, header: &[&str], rows: &[Vec<String>]) -> String {
        if rows.is_empty() {
            return format!("{}\n", "No results found".yellow());
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            header
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for row in rows {
            table.add_row(row.clone());
        }

        format!(
            "{}\nRows returned: {}\n\n{}\n",
            title.bold().green(),
            rows.len(),
            table
        )
    }

    fn format_csv(header: &[&str], rows: &[Vec<String>]) -> String {
        let mut output = header.join(",");
        output.push('\n');
        for row in rows {
            output.push_str(&row.join(","));
            output.push('\n');
        }
        output
    }
}
