//! `aegis ctrl` command - Control catalog management

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
use crate::registers::control::{Control, ControlFamily, TERMINAL_STATUSES};

#[derive(Subcommand, Debug)]
pub enum CtrlCommands {
    /// List controls with filtering
    List(ListArgs),

    /// Create a new control
    New(NewArgs),

    /// Show a control's details
    Show(ShowArgs),
}

/// Implementation status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImplementationFilter {
    NotImplemented,
    Planned,
    PartiallyImplemented,
    Implemented,
    NotApplicable,
    All,
}

impl std::fmt::Display for ImplementationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImplementationFilter::NotImplemented => write!(f, "not_implemented"),
            ImplementationFilter::Planned => write!(f, "planned"),
            ImplementationFilter::PartiallyImplemented => write!(f, "partially_implemented"),
            ImplementationFilter::Implemented => write!(f, "implemented"),
            ImplementationFilter::NotApplicable => write!(f, "not_applicable"),
            ImplementationFilter::All => write!(f, "all"),
        }
    }
}

/// Column selection for list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Id,
    Title,
    Family,
    Status,
    Progress,
    Next,
}

impl ListColumn {
    fn sort_key(&self) -> SortKey {
        match self {
            ListColumn::Id => SortKey::Id,
            ListColumn::Title => SortKey::Text("title".to_string()),
            ListColumn::Family => SortKey::Category("family".to_string()),
            ListColumn::Status => SortKey::Category("status".to_string()),
            ListColumn::Progress => SortKey::Number("progress".to_string()),
            ListColumn::Next => SortKey::Date("next_assessment".to_string()),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by implementation status
    #[arg(long, short = 's', default_value = "all")]
    pub status: ImplementationFilter,

    /// Filter by control family
    #[arg(long, short = 'F')]
    pub family: Option<String>,

    /// Filter by owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Show only controls with an assessment past due
    #[arg(long)]
    pub overdue: bool,

    /// Search in title, description, reference, and tags
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
    /// Control title
    #[arg(long, short = 't')]
    pub title: String,

    /// What the control does and how it is operated
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Control family (access_control, audit_accountability, ...)
    #[arg(long, short = 'F')]
    pub family: String,

    /// External framework reference (e.g., "NIST SP 800-53 AC-2")
    #[arg(long)]
    pub reference: Option<String>,

    /// Control owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Control ID or unique ID prefix
    pub id: String,
}

/// Run a control subcommand
pub fn run(cmd: CtrlCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CtrlCommands::List(args) => run_list(args, global),
        CtrlCommands::New(args) => run_new(args, global),
        CtrlCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let controls: Vec<Control> = loader::load_register(&project);

    let store = RecordStore::from_records(loader::to_records(&controls))
        .map_err(|e| miette::miette!("{}", e))?;

    let mut state = FilterState::new()
        .searchable(&["title", "description", "reference", "tags"])
        .with_category("status", args.status.to_string());
    if let Some(ref family) = args.family {
        state = state.with_category("family", family);
    }
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
                field: "next_assessment".to_string(),
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
                Column::new("TITLE", 30),
                Column::new("FAMILY", 24),
                Column::new("STATUS", 22),
                Column::new("PROG", 6),
                Column::new("NEXT ASSESS", 11),
            ];
            let rows: Vec<Vec<CellValue>> = results.iter().map(list_row).collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            render_list(&columns, &rows, format, &config, "control");
        }
    }

    Ok(())
}

fn list_row(record: &Record) -> Vec<CellValue> {
    vec![
        CellValue::Id(record.id().to_string()),
        CellValue::Text(record.text("title").unwrap_or("-").to_string()),
        CellValue::Text(record.category("family").unwrap_or("-").to_string()),
        CellValue::Status(record.category("status").unwrap_or("-").to_string()),
        CellValue::Progress(record.number("progress")),
        CellValue::Date(record.date("next_assessment")),
    ]
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();

    let family = ControlFamily::from_str(&args.family).map_err(|e| miette::miette!("{}", e))?;
    let mut control = Control::new(args.title, args.description, family, config.author());
    control.reference = args.reference;
    control.owner = args.owner;

    let path = project.record_path(&control.id);
    let yaml = serde_yml::to_string(&control).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !global.quiet {
        println!("{} Created control {}", style("✓").green(), control.id);
    }
    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let Some((path, control)) = loader::load_entry::<Control>(&project, &args.id)? else {
        return Err(miette::miette!("No control found matching '{}'", args.id));
    };

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&control).into_diagnostic()?
            );
        }
        _ => {
            if global.verbose {
                println!("{} {}", style("#").dim(), style(path.display()).dim());
            }
            print!("{}", serde_yml::to_string(&control).into_diagnostic()?);
        }
    }

    Ok(())
}
