//! `aegis report` command - Generate compliance reports

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::{open_project, today};
use crate::cli::helpers::truncate_str;
use crate::cli::GlobalOpts;
use crate::core::aggregate;
use crate::core::loader;
use crate::core::Record;
use crate::registers::{control, incident, poam, risk};
use crate::registers::{Control, Incident, Poam, Risk};

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Control implementation posture by family
    Posture(PostureArgs),

    /// All open items (risks, incidents, POA&Ms) with overdue flags
    OpenItems(OpenItemsArgs),
}

#[derive(clap::Args, Debug)]
pub struct PostureArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct OpenItemsArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Include only items past their due date
    #[arg(long)]
    pub overdue_only: bool,
}

/// Run a report subcommand
pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Posture(args) => run_posture(args, global),
        ReportCommands::OpenItems(args) => run_open_items(args, global),
    }
}

fn run_posture(args: PostureArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let controls = loader::to_records(&loader::load_register::<Control>(&project));
    let now = today();

    let mut output = String::new();
    output.push_str("# Compliance Posture Report\n\n");

    output.push_str("## Summary\n\n");
    let implemented_pct =
        aggregate::percentage(&controls, |r| has_status(r, "implemented"));
    let mut summary = Builder::default();
    summary.push_record(["Metric", "Value"]);
    summary.push_record(["Controls", &controls.len().to_string()]);
    summary.push_record(["Implemented %", &format!("{:.1}", implemented_pct)]);
    summary.push_record([
        "Assessments overdue",
        &aggregate::overdue_count(&controls, "next_assessment", control::TERMINAL_STATUSES, now)
            .to_string(),
    ]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    output.push_str("\n## By Family\n\n");
    let mut by_family = Builder::default();
    by_family.push_record(["Family", "Controls", "Implemented", "Implemented %"]);
    for (name, total) in aggregate::counts_by_category(&controls, "family") {
        let in_family: Vec<Record> = controls
            .iter()
            .filter(|r| r.category("family") == Some(name.as_str()))
            .cloned()
            .collect();
        let implemented = aggregate::count_where(&in_family, |r| has_status(r, "implemented"));
        let pct = aggregate::percentage(&in_family, |r| has_status(r, "implemented"));
        by_family.push_record([
            name,
            total.to_string(),
            implemented.to_string(),
            format!("{:.1}", pct),
        ]);
    }
    output.push_str(&by_family.build().with(Style::markdown()).to_string());
    output.push('\n');

    write_output(&output, args.output)
}

fn run_open_items(args: OpenItemsArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let now = today();

    let risks = loader::to_records(&loader::load_register::<Risk>(&project));
    let incidents = loader::to_records(&loader::load_register::<Incident>(&project));
    let poams = loader::to_records(&loader::load_register::<Poam>(&project));

    let open_risks = open_items(&risks, risk::TERMINAL_STATUSES);
    let open_incidents = open_items(&incidents, incident::TERMINAL_STATUSES);
    let open_poams = open_items(&poams, poam::TERMINAL_STATUSES);

    let mut output = String::new();
    output.push_str("# Open Items Report\n\n");

    output.push_str("## Summary\n\n");
    let mut summary = Builder::default();
    summary.push_record(["Category", "Open", "Overdue"]);
    summary.push_record([
        "Risks".to_string(),
        open_risks.len().to_string(),
        aggregate::overdue_count(&risks, "due_date", risk::TERMINAL_STATUSES, now).to_string(),
    ]);
    summary.push_record([
        "Incidents".to_string(),
        open_incidents.len().to_string(),
        aggregate::overdue_count(&incidents, "due_date", incident::TERMINAL_STATUSES, now)
            .to_string(),
    ]);
    summary.push_record([
        "POA&Ms".to_string(),
        open_poams.len().to_string(),
        aggregate::overdue_count(&poams, "due_date", poam::TERMINAL_STATUSES, now).to_string(),
    ]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    for (heading, items, terminal) in [
        ("Open Risks", &open_risks, risk::TERMINAL_STATUSES),
        ("Open Incidents", &open_incidents, incident::TERMINAL_STATUSES),
        ("Open POA&Ms", &open_poams, poam::TERMINAL_STATUSES),
    ] {
        let rows: Vec<&Record> = items
            .iter()
            .filter(|r| !args.overdue_only || is_overdue(r, terminal, now))
            .collect();
        if rows.is_empty() {
            continue;
        }

        output.push_str(&format!("\n## {}\n\n", heading));
        let mut table = Builder::default();
        table.push_record(["ID", "Title", "Severity", "Status", "Due", "Overdue"]);
        for record in rows {
            table.push_record([
                record.id().to_string(),
                truncate_str(record.text("title").unwrap_or("-"), 40),
                record.category("severity").unwrap_or("-").to_string(),
                record.category("status").unwrap_or("-").to_string(),
                record
                    .date("due_date")
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                if is_overdue(record, terminal, now) {
                    "yes".to_string()
                } else {
                    "no".to_string()
                },
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    write_output(&output, args.output)
}

fn has_status(record: &Record, status: &str) -> bool {
    record
        .category("status")
        .is_some_and(|s| s.eq_ignore_ascii_case(status))
}

fn open_items(records: &[Record], terminal: &[&str]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| !terminal.iter().any(|t| has_status(r, t)))
        .cloned()
        .collect()
}

fn is_overdue(record: &Record, terminal: &[&str], now: chrono::NaiveDate) -> bool {
    aggregate::overdue_count(std::slice::from_ref(record), "due_date", terminal, now) == 1
}

pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
