//! `aegis poam` command - POA&M register management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::str::FromStr;

use crate::cli::commands::risk::SeverityFilter;
use crate::cli::commands::{open_project, today};
use crate::cli::table::{render_list, CellValue, Column, TableConfig};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader;
use crate::core::{
    build, query, Config, Constraint, FilterState, Preset, Record, RecordStore, SortKey, SortOrder,
};
use crate::registers::poam::{Poam, TERMINAL_STATUSES};
use crate::registers::Severity;

#[derive(Subcommand, Debug)]
pub enum PoamCommands {
    /// List POA&M entries with filtering
    List(ListArgs),

    /// Create a new POA&M entry
    New(NewArgs),

    /// Show a POA&M entry's details
    Show(ShowArgs),
}

/// Status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Open,
    InProgress,
    Completed,
    RiskAccepted,
    All,
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Open => write!(f, "open"),
            StatusFilter::InProgress => write!(f, "in_progress"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::RiskAccepted => write!(f, "risk_accepted"),
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
    Progress,
    Due,
}

impl ListColumn {
    fn sort_key(&self) -> SortKey {
        match self {
            ListColumn::Id => SortKey::Id,
            ListColumn::Title => SortKey::Text("title".to_string()),
            ListColumn::Severity => SortKey::Number("severity_rank".to_string()),
            ListColumn::Status => SortKey::Category("status".to_string()),
            ListColumn::Progress => SortKey::Number("progress".to_string()),
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

    /// Filter by owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Show only critical entries
    #[arg(long)]
    pub critical: bool,

    /// Show only entries past their scheduled completion
    #[arg(long)]
    pub overdue: bool,

    /// Search in title, description, source, and tags
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by column
    #[arg(long, default_value = "due")]
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
    /// The weakness being remediated
    #[arg(long, short = 't')]
    pub title: String,

    /// Remediation plan
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Severity (critical, high, medium, low)
    #[arg(long, short = 'S')]
    pub severity: Option<String>,

    /// Scheduled completion date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Originating finding or audit reference
    #[arg(long)]
    pub source: Option<String>,

    /// Remediation owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// POA&M ID or unique ID prefix
    pub id: String,
}

/// Run a POA&M subcommand
pub fn run(cmd: PoamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PoamCommands::List(args) => run_list(args, global),
        PoamCommands::New(args) => run_new(args, global),
        PoamCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let poams: Vec<Poam> = loader::load_register(&project);

    let store = RecordStore::from_records(loader::to_records(&poams))
        .map_err(|e| miette::miette!("{}", e))?;

    let mut state = FilterState::new()
        .searchable(&["title", "description", "source", "tags"])
        .with_category("severity", args.severity.to_string())
        .with_category("status", args.status.to_string());
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
                Column::new("STATUS", 14),
                Column::new("PROG", 6),
                Column::new("DUE", 11),
            ];
            let rows: Vec<Vec<CellValue>> = results.iter().map(list_row).collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            render_list(&columns, &rows, format, &config, "poam");
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
        CellValue::Progress(record.number("progress")),
        CellValue::Date(record.date("due_date")),
    ]
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();

    let mut poam = Poam::new(args.title, args.description, config.author());
    if let Some(ref severity) = args.severity {
        poam.severity = Severity::from_str(severity).map_err(|e| miette::miette!("{}", e))?;
    }
    poam.due_date = args.due;
    poam.source = args.source;
    poam.owner = args.owner;

    let path = project.record_path(&poam.id);
    let yaml = serde_yml::to_string(&poam).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !global.quiet {
        println!("{} Created POA&M entry {}", style("✓").green(), poam.id);
    }
    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let Some((path, poam)) = loader::load_entry::<Poam>(&project, &args.id)? else {
        return Err(miette::miette!("No POA&M entry found matching '{}'", args.id));
    };

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&poam).into_diagnostic()?);
        }
        _ => {
            if global.verbose {
                println!("{} {}", style("#").dim(), style(path.display()).dim());
            }
            print!("{}", serde_yml::to_string(&poam).into_diagnostic()?);
        }
    }

    Ok(())
}
