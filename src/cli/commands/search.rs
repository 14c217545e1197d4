//! `aegis search` command - Search across all registers
//!
//! Provides unified substring search across every record collection.

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::open_project;
use crate::cli::table::{render_list, CellValue, Column, TableConfig};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader;
use crate::core::{build, query, FilterState, Record, RecordStore, SortOrder};
use crate::registers::{Control, Incident, Poam, Policy, Risk};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search term (searches in title, description, reference, source, and tags)
    pub query: String,

    /// Filter by register kind(s)
    #[arg(long, short = 'k', value_delimiter = ',')]
    pub kind: Option<Vec<KindFilter>>,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Filter by owner/assignee
    #[arg(long)]
    pub owner: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum KindFilter {
    Risk,
    Control,
    Incident,
    Policy,
    Poam,
}

impl KindFilter {
    fn label(&self) -> &'static str {
        match self {
            KindFilter::Risk => "risk",
            KindFilter::Control => "control",
            KindFilter::Incident => "incident",
            KindFilter::Policy => "policy",
            KindFilter::Poam => "poam",
        }
    }
}

/// Run the search command
pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    // Pull every register into one generic record set
    let mut records: Vec<Record> = Vec::new();
    records.extend(loader::to_records(&loader::load_register::<Risk>(&project)));
    records.extend(loader::to_records(&loader::load_register::<Control>(
        &project,
    )));
    records.extend(loader::to_records(&loader::load_register::<Incident>(
        &project,
    )));
    records.extend(loader::to_records(&loader::load_register::<Policy>(
        &project,
    )));
    records.extend(loader::to_records(&loader::load_register::<Poam>(&project)));

    let store = RecordStore::from_records(records).map_err(|e| miette::miette!("{}", e))?;

    let mut state = FilterState::new()
        .with_search(&args.query)
        .searchable(&["title", "description", "reference", "source", "tags"]);
    if let Some(ref status) = args.status {
        state = state.with_category("status", status);
    }
    if let Some(ref owner) = args.owner {
        state = state.with_category("owner", owner);
    }

    let predicate = build(&state);
    let mut results = query(&store, &predicate, None, SortOrder::Ascending);

    // Kind filtering is a union across the selected kinds, so it is applied
    // on top of the ANDed core predicate
    if let Some(ref kinds) = args.kind {
        results.retain(|r| {
            r.category("kind")
                .is_some_and(|k| kinds.iter().any(|f| f.label() == k))
        });
    }
    results.truncate(args.limit);

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
                Column::new("KIND", 9),
                Column::new("TITLE", 40),
                Column::new("STATUS", 14),
            ];
            let rows: Vec<Vec<CellValue>> = results
                .iter()
                .map(|record| {
                    vec![
                        CellValue::Id(record.id().to_string()),
                        CellValue::Kind(record.category("kind").unwrap_or("-").to_string()),
                        CellValue::Text(record.text("title").unwrap_or("-").to_string()),
                        CellValue::Status(record.category("status").unwrap_or("-").to_string()),
                    ]
                })
                .collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            render_list(&columns, &rows, format, &config, "match");
        }
    }

    Ok(())
}
