//! `aegis validate` command - Check register files and data invariants
//!
//! Strictly parses every register file, checks that ids are globally
//! unique, and enforces the numeric/date invariants the list views assume
//! (progress in [0, 100], ratings in [1, 5], resolution after detection).

use console::style;
use miette::Result;
use std::fs;

use crate::cli::commands::open_project;
use crate::cli::GlobalOpts;
use crate::core::project::Project;
use crate::core::record::{Record, RegisterEntry};
use crate::core::store::RecordStore;
use crate::registers::{Control, Incident, Poam, Policy, Risk};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {}

/// Run the validate command
pub fn run(_args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut errors: Vec<String> = Vec::new();
    let mut records: Vec<Record> = Vec::new();

    let risk_count = check_register::<Risk>(&project, &mut errors, &mut records);
    let ctrl_count = check_register::<Control>(&project, &mut errors, &mut records);
    let inc_count = check_register::<Incident>(&project, &mut errors, &mut records);
    let pol_count = check_register::<Policy>(&project, &mut errors, &mut records);
    let poam_count = check_register::<Poam>(&project, &mut errors, &mut records);

    // Ids must be unique across the whole project, not just per register
    if let Err(e) = RecordStore::from_records(records.clone()) {
        errors.push(e.to_string());
    }

    for record in &records {
        check_invariants(record, &mut errors);
    }

    if !global.quiet {
        println!(
            "Checked {} risk(s), {} control(s), {} incident(s), {} policy(ies), {} poam(s)",
            risk_count, ctrl_count, inc_count, pol_count, poam_count
        );
    }

    if errors.is_empty() {
        if !global.quiet {
            println!("{} All register files valid", style("✓").green());
        }
        Ok(())
    } else {
        for error in &errors {
            eprintln!("{} {}", style("✗").red(), error);
        }
        Err(miette::miette!(
            "validation failed with {} error(s)",
            errors.len()
        ))
    }
}

/// Parse every file of one register, collecting errors instead of skipping
fn check_register<T: RegisterEntry>(
    project: &Project,
    errors: &mut Vec<String>,
    records: &mut Vec<Record>,
) -> usize {
    let mut count = 0;

    for path in project.iter_record_files(T::KIND) {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };
        match serde_yml::from_str::<T>(&content) {
            Ok(entry) => {
                if entry.id().kind() != T::KIND {
                    errors.push(format!(
                        "{}: id {} does not belong in the {} register",
                        path.display(),
                        entry.id(),
                        T::KIND.dir_name()
                    ));
                }
                records.push(entry.to_record());
                count += 1;
            }
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
            }
        }
    }

    count
}

fn check_invariants(record: &Record, errors: &mut Vec<String>) {
    if let Some(progress) = record.number("progress") {
        if !(0.0..=100.0).contains(&progress) {
            errors.push(format!(
                "{}: progress {} outside [0, 100]",
                record.id(),
                progress
            ));
        }
    }
    for field in ["likelihood", "impact"] {
        if let Some(rating) = record.number(field) {
            if !(1.0..=5.0).contains(&rating) {
                errors.push(format!(
                    "{}: {} rating {} outside [1, 5]",
                    record.id(),
                    field,
                    rating
                ));
            }
        }
    }
    if let (Some(detected), Some(resolved)) = (record.date("detected"), record.date("resolved")) {
        if resolved < detected {
            errors.push(format!(
                "{}: resolved {} precedes detected {}",
                record.id(),
                resolved,
                detected
            ));
        }
    }
}
