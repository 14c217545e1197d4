//! Table formatting utilities for CLI list commands
//!
//! This module provides a unified table output system for the register
//! list commands. It is the view layer: severity/status color mapping
//! lives here and only here, never in the query core.

use chrono::NaiveDate;
use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, format_short_id_str, truncate_str};
use crate::cli::OutputFormat;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 risk(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// One output column
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub width: usize,
}

impl Column {
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }
}

/// A typed cell value with display/color semantics
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record ID (truncated, cyan)
    Id(String),
    /// Plain text (truncated to fit)
    Text(String),
    /// Status with color coding by lifecycle stage
    Status(String),
    /// Severity with color coding (critical/high/medium/low)
    Severity(String),
    /// Register kind tag (risk/control/incident/policy/poam)
    Kind(String),
    /// Progress percentage with thresholds
    Progress(Option<f64>),
    /// Risk score with thresholds
    Score(Option<f64>),
    /// Calendar date (displays "-" if None)
    Date(Option<NaiveDate>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Uncolored rendition, used for CSV/markdown/ID output
    pub fn plain(&self) -> String {
        match self {
            CellValue::Id(id) => format_short_id_str(id),
            CellValue::Text(s) => s.clone(),
            CellValue::Status(s) => s.clone(),
            CellValue::Severity(s) => s.clone(),
            CellValue::Kind(k) => k.clone(),
            CellValue::Progress(opt) => match opt {
                Some(p) => format!("{:.0}%", p),
                None => "-".to_string(),
            },
            CellValue::Score(opt) => match opt {
                Some(s) => format!("{:.0}", s),
                None => "-".to_string(),
            },
            CellValue::Date(opt) => match opt {
                Some(d) => d.format("%Y-%m-%d").to_string(),
                None => "-".to_string(),
            },
            CellValue::Empty => "-".to_string(),
        }
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                let display = format_short_id_str(id);
                format!("{:<width$}", style(&display).cyan(), width = width)
            }
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Status(s) => {
                let styled = match s.as_str() {
                    "open" | "not_implemented" => style(s).yellow(),
                    "in_progress" | "investigating" | "in_review" | "planned" => style(s).cyan(),
                    "contained" | "partially_implemented" => style(s).magenta(),
                    "mitigated" | "resolved" | "closed" | "completed" | "implemented"
                    | "published" | "approved" => style(s).green(),
                    "accepted" | "risk_accepted" | "not_applicable" => style(s).dim(),
                    "draft" => style(s).dim(),
                    "retired" => style(s).red().dim(),
                    _ => style(s).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Severity(s) => {
                let styled = match s.as_str() {
                    "critical" => style(s).red().bold(),
                    "high" => style(s).yellow(),
                    "medium" => style(s).white(),
                    "low" => style(s).dim(),
                    _ => style(s).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Kind(k) => {
                format!("{:<width$}", style(k).cyan(), width = width)
            }
            CellValue::Progress(opt) => {
                let styled = match opt {
                    Some(p) => {
                        let s = format!("{:.0}%", p);
                        if *p >= 100.0 {
                            style(s).green()
                        } else if *p >= 50.0 {
                            style(s).yellow()
                        } else {
                            style(s).red()
                        }
                    }
                    None => style("-".to_string()).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Score(opt) => {
                let styled = match opt {
                    Some(score) => {
                        let s = format!("{:.0}", score);
                        if *score >= 15.0 {
                            style(s).red().bold()
                        } else if *score >= 8.0 {
                            style(s).yellow()
                        } else {
                            style(s).white()
                        }
                    }
                    None => style("-".to_string()).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Date(opt) => match opt {
                Some(d) => format!("{:<width$}", d.format("%Y-%m-%d"), width = width),
                None => format!("{:<width$}", "-", width = width),
            },
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }
}

/// Render rows for a list command in the requested format.
///
/// Json/Yaml are serialized by the callers from the underlying records;
/// everything else goes through here.
pub fn render_list(
    columns: &[Column],
    rows: &[Vec<CellValue>],
    format: OutputFormat,
    config: &TableConfig,
    noun: &str,
) {
    match format {
        OutputFormat::Csv => {
            let header: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
            println!("{}", header.join(","));
            for row in rows {
                let cells: Vec<String> = row.iter().map(|c| escape_csv(&c.plain())).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(columns.iter().map(|c| c.header.to_string()));
            for row in rows {
                builder.push_record(row.iter().map(|c| c.plain()));
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Id => {
            for row in rows {
                if let Some(cell) = row.first() {
                    match cell {
                        // IDs must stay whole for piping
                        CellValue::Id(id) => println!("{}", id),
                        other => println!("{}", other.plain()),
                    }
                }
            }
        }
        _ => {
            let header: String = columns
                .iter()
                .map(|c| format!("{:<width$}", c.header, width = c.width))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{}", style(header).bold());
            for row in rows {
                let line: String = row
                    .iter()
                    .zip(columns.iter())
                    .map(|(cell, col)| cell.format_tsv(col.width))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{}", line);
            }
            if config.show_summary {
                println!();
                println!("{} {}(s) found", rows.len(), noun);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rendition() {
        insta::assert_snapshot!(CellValue::Progress(Some(62.4)).plain(), @"62%");
        insta::assert_snapshot!(CellValue::Progress(None).plain(), @"-");
        insta::assert_snapshot!(
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5)).plain(),
            @"2024-01-05"
        );
        insta::assert_snapshot!(CellValue::Score(Some(20.0)).plain(), @"20");
    }

    #[test]
    fn test_plain_id_is_truncated() {
        let cell = CellValue::Id("RISK-01J123456789ABCDEF123456".to_string());
        insta::assert_snapshot!(cell.plain(), @"RISK-01J12345...");
    }
}
