//! `aegis policy` command - Policy library management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::commands::{open_project, today};
use crate::cli::table::{render_list, CellValue, Column, TableConfig};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader;
use crate::core::{
    build, query, Config, Constraint, FilterState, Preset, Record, RecordStore, SortKey, SortOrder,
};
use crate::registers::policy::{Policy, TERMINAL_STATUSES};

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// List policies with filtering
    List(ListArgs),

    /// Create a new policy
    New(NewArgs),

    /// Show a policy's details
    Show(ShowArgs),
}

/// Status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Draft,
    InReview,
    Approved,
    Published,
    Retired,
    All,
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Draft => write!(f, "draft"),
            StatusFilter::InReview => write!(f, "in_review"),
            StatusFilter::Approved => write!(f, "approved"),
            StatusFilter::Published => write!(f, "published"),
            StatusFilter::Retired => write!(f, "retired"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Column selection for list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Id,
    Title,
    Status,
    Owner,
    Review,
}

impl ListColumn {
    fn sort_key(&self) -> SortKey {
        match self {
            ListColumn::Id => SortKey::Id,
            ListColumn::Title => SortKey::Text("title".to_string()),
            ListColumn::Status => SortKey::Category("status".to_string()),
            ListColumn::Owner => SortKey::Category("owner".to_string()),
            ListColumn::Review => SortKey::Date("next_review".to_string()),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Show only policies past their review date
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
    /// Policy title
    #[arg(long, short = 't')]
    pub title: String,

    /// Scope and intent of the policy
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Policy owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Document version
    #[arg(long)]
    pub version: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Policy ID or unique ID prefix
    pub id: String,
}

/// Run a policy subcommand
pub fn run(cmd: PolicyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PolicyCommands::List(args) => run_list(args, global),
        PolicyCommands::New(args) => run_new(args, global),
        PolicyCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let policies: Vec<Policy> = loader::load_register(&project);

    let store = RecordStore::from_records(loader::to_records(&policies))
        .map_err(|e| miette::miette!("{}", e))?;

    let mut state = FilterState::new()
        .searchable(&["title", "description", "tags"])
        .with_category("status", args.status.to_string());
    if let Some(ref owner) = args.owner {
        state = state.with_category("owner", owner);
    }
    if let Some(ref search) = args.search {
        state = state.with_search(search);
    }
    if args.overdue {
        state = state.with_preset(Preset::new(
            "overdue",
            vec![Constraint::Overdue {
                field: "next_review".to_string(),
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
                Column::new("VER", 5),
                Column::new("STATUS", 11),
                Column::new("OWNER", 14),
                Column::new("REVIEW", 11),
            ];
            let rows: Vec<Vec<CellValue>> = results.iter().map(list_row).collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            render_list(&columns, &rows, format, &config, "policy");
        }
    }

    Ok(())
}

fn list_row(record: &Record) -> Vec<CellValue> {
    vec![
        CellValue::Id(record.id().to_string()),
        CellValue::Text(record.text("title").unwrap_or("-").to_string()),
        CellValue::Text(record.text("version").unwrap_or("-").to_string()),
        CellValue::Status(record.category("status").unwrap_or("-").to_string()),
        CellValue::Text(record.category("owner").unwrap_or("-").to_string()),
        CellValue::Date(record.date("next_review")),
    ]
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();

    let mut policy = Policy::new(args.title, args.description, config.author());
    policy.owner = args.owner;
    if let Some(version) = args.version {
        policy.version = version;
    }

    let path = project.record_path(&policy.id);
    let yaml = serde_yml::to_string(&policy).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !global.quiet {
        println!("{} Created policy {}", style("✓").green(), policy.id);
    }
    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let Some((path, policy)) = loader::load_entry::<Policy>(&project, &args.id)? else {
        return Err(miette::miette!("No policy found matching '{}'", args.id));
    };

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&policy).into_diagnostic()?
            );
        }
        _ => {
            if global.verbose {
                println!("{} {}", style("#").dim(), style(path.display()).dim());
            }
            print!("{}", serde_yml::to_string(&policy).into_diagnostic()?);
        }
    }

    Ok(())
}
