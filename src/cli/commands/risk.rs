//! `aegis risk` command - Risk register management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::str::FromStr;

use crate::cli::commands::{open_project, today};
use crate::cli::table::{render_list, CellValue, Column, TableConfig};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader;
use crate::core::{
    build, query, Config, Constraint, FilterState, Preset, Record, RecordStore, SortKey, SortOrder,
};
use crate::registers::risk::{Risk, RiskCategory, TERMINAL_STATUSES};
use crate::registers::Severity;

#[derive(Subcommand, Debug)]
pub enum RiskCommands {
    /// List risks with filtering
    List(ListArgs),

    /// Create a new risk
    New(NewArgs),

    /// Show a risk's details
    Show(ShowArgs),
}

/// Severity filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeverityFilter {
    Critical,
    High,
    Medium,
    Low,
    All,
}

impl std::fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityFilter::Critical => write!(f, "critical"),
            SeverityFilter::High => write!(f, "high"),
            SeverityFilter::Medium => write!(f, "medium"),
            SeverityFilter::Low => write!(f, "low"),
            SeverityFilter::All => write!(f, "all"),
        }
    }
}

/// Status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Open,
    InProgress,
    Mitigated,
    Accepted,
    Closed,
    All,
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Open => write!(f, "open"),
            StatusFilter::InProgress => write!(f, "in_progress"),
            StatusFilter::Mitigated => write!(f, "mitigated"),
            StatusFilter::Accepted => write!(f, "accepted"),
            StatusFilter::Closed => write!(f, "closed"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Column selection for list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Id,
    Title,
    Severity,
    Status,
    Score,
    Due,
}

impl ListColumn {
    fn sort_key(&self) -> SortKey {
        match self {
            ListColumn::Id => SortKey::Id,
            ListColumn::Title => SortKey::Text("title".to_string()),
            ListColumn::Severity => SortKey::Number("severity_rank".to_string()),
            ListColumn::Status => SortKey::Category("status".to_string()),
            ListColumn::Score => SortKey::Number("risk_score".to_string()),
            ListColumn::Due => SortKey::Date("due_date".to_string()),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by severity
    #[arg(long, short = 'S', default_value = "all")]
    pub severity: SeverityFilter,

    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by category (operational, technical, compliance, financial, third_party)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Show only critical risks
    #[arg(long)]
    pub critical: bool,

    /// Show only risks past their due date (open statuses only)
    #[arg(long)]
    pub overdue: bool,

    /// Search in title, description, and tags
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by column
    #[arg(long, default_value = "title")]
    pub sort: ListColumn,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Risk title
    #[arg(long, short = 't')]
    pub title: String,

    /// Detailed description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Severity (critical, high, medium, low)
    #[arg(long, short = 'S')]
    pub severity: Option<String>,

    /// Category (operational, technical, compliance, financial, third_party)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Likelihood rating 1-5
    #[arg(long)]
    pub likelihood: Option<u8>,

    /// Impact rating 1-5
    #[arg(long)]
    pub impact: Option<u8>,

    /// Risk owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Mitigation due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Risk ID or unique ID prefix
    pub id: String,
}

/// Run a risk subcommand
pub fn run(cmd: RiskCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RiskCommands::List(args) => run_list(args, global),
        RiskCommands::New(args) => run_new(args, global),
        RiskCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let risks: Vec<Risk> = loader::load_register(&project);

    let store = RecordStore::from_records(loader::to_records(&risks))
        .map_err(|e| miette::miette!("{}", e))?;

    let mut state = FilterState::new()
        .searchable(&["title", "description", "tags"])
        .with_category("severity", args.severity.to_string())
        .with_category("status", args.status.to_string());
    if let Some(ref category) = args.category {
        state = state.with_category("category", category);
    }
    if let Some(ref owner) = args.owner {
        state = state.with_category("owner", owner);
    }
    if let Some(ref search) = args.search {
        state = state.with_search(search);
    }
    if args.critical {
        state = state.with_preset(Preset::new(
            "critical",
            vec![Constraint::CategoryEquals {
                field: "severity".to_string(),
                value: "critical".to_string(),
            }],
        ));
    }
    if args.overdue {
        state = state.with_preset(Preset::new(
            "overdue",
            vec![Constraint::Overdue {
                field: "due_date".to_string(),
                terminal_statuses: TERMINAL_STATUSES.iter().map(|s| s.to_string()).collect(),
                now: today(),
            }],
        ));
    }

    let predicate = build(&state);
    let order = if args.reverse {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let mut results = query(&store, &predicate, Some(&args.sort.sort_key()), order);
    if let Some(limit) = args.limit {
        results.truncate(limit);
    }

    if args.count {
        println!("{}", results.len());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&results).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&results).into_diagnostic()?);
        }
        format => {
            let columns = [
                Column::new("ID", 17),
                Column::new("TITLE", 34),
                Column::new("SEVERITY", 10),
                Column::new("STATUS", 12),
                Column::new("SCORE", 6),
                Column::new("DUE", 11),
            ];
            let rows: Vec<Vec<CellValue>> = results.iter().map(list_row).collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            render_list(&columns, &rows, format, &config, "risk");
        }
    }

    Ok(())
}

fn list_row(record: &Record) -> Vec<CellValue> {
    vec![
        CellValue::Id(record.id().to_string()),
        CellValue::Text(record.text("title").unwrap_or("-").to_string()),
        CellValue::Severity(record.category("severity").unwrap_or("-").to_string()),
        CellValue::Status(record.category("status").unwrap_or("-").to_string()),
        CellValue::Score(record.number("risk_score")),
        CellValue::Date(record.date("due_date")),
    ]
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();

    let mut risk = Risk::new(args.title, args.description, config.author());
    if let Some(ref severity) = args.severity {
        risk.severity = Severity::from_str(severity).map_err(|e| miette::miette!("{}", e))?;
    }
    if let Some(ref category) = args.category {
        risk.category = RiskCategory::from_str(category).map_err(|e| miette::miette!("{}", e))?;
    }
    risk.likelihood = args.likelihood;
    risk.impact = args.impact;
    risk.risk_score = risk.computed_score();
    risk.owner = args.owner;
    risk.due_date = args.due;
    risk.identified = Some(today());

    let path = project.record_path(&risk.id);
    let yaml = serde_yml::to_string(&risk).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !global.quiet {
        println!("{} Created risk {}", style("✓").green(), risk.id);
    }
    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let Some((path, risk)) = loader::load_entry::<Risk>(&project, &args.id)? else {
        return Err(miette::miette!("No risk found matching '{}'", args.id));
    };

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&risk).into_diagnostic()?);
        }
        _ => {
            if global.verbose {
                println!("{} {}", style("#").dim(), style(path.display()).dim());
            }
            print!("{}", serde_yml::to_string(&risk).into_diagnostic()?);
        }
    }

    Ok(())
}
