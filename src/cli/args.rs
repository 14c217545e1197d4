//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    ctrl::CtrlCommands,
    incident::IncidentCommands,
    init::InitArgs,
    poam::PoamCommands,
    policy::PolicyCommands,
    report::ReportCommands,
    risk::RiskCommands,
    search::SearchArgs,
    status::StatusArgs,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "aegis")]
#[command(author, version, about = "Aegis Compliance Toolkit")]
#[command(long_about = "A Unix-style toolkit for managing compliance program records as plain text files with unified filtering and rollups.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .aegis/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new Aegis project
    Init(InitArgs),

    /// Risk register management
    #[command(subcommand)]
    Risk(RiskCommands),

    /// Control catalog management
    #[command(subcommand)]
    Ctrl(CtrlCommands),

    /// Incident log management
    #[command(subcommand)]
    Incident(IncidentCommands),

    /// Policy library management
    #[command(subcommand)]
    Policy(PolicyCommands),

    /// POA&M register management (remediation tracking)
    #[command(subcommand)]
    Poam(PoamCommands),

    /// Search across all registers
    Search(SearchArgs),

    /// Show compliance posture dashboard
    Status(StatusArgs),

    /// Generate compliance reports (posture, open items)
    #[command(subcommand)]
    Report(ReportCommands),

    /// Validate register files and invariants
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
