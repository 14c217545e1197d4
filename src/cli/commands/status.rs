//! `aegis status` command - Compliance posture dashboard

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::{open_project, today};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::aggregate::{self, SummaryMetric};
use crate::core::loader;
use crate::core::Record;
use crate::registers::{control, incident, poam, policy, risk};
use crate::registers::{Control, Incident, Poam, Policy, Risk};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show only one section (risks, controls, incidents, policies, poams)
    #[arg(long)]
    pub section: Option<String>,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let now = today();

    let risks = loader::to_records(&loader::load_register::<Risk>(&project));
    let controls = loader::to_records(&loader::load_register::<Control>(&project));
    let incidents = loader::to_records(&loader::load_register::<Incident>(&project));
    let policies = loader::to_records(&loader::load_register::<Policy>(&project));
    let poams = loader::to_records(&loader::load_register::<Poam>(&project));

    let sections = [
        ("risks", "RISK REGISTER", risk_cards(&risks, now)),
        ("controls", "CONTROL CATALOG", control_cards(&controls, now)),
        ("incidents", "INCIDENT LOG", incident_cards(&incidents, now)),
        ("policies", "POLICY LIBRARY", policy_cards(&policies, now)),
        ("poams", "POA&M REGISTER", poam_cards(&poams, now)),
    ];

    let posture = calculate_posture(&risks, &incidents, &poams, &controls, &policies, now);

    match global.format {
        OutputFormat::Json => {
            let mut body = serde_json::Map::new();
            for (key, _, cards) in &sections {
                if section_selected(&args, key) {
                    body.insert(
                        key.to_string(),
                        serde_json::to_value(cards).into_diagnostic()?,
                    );
                }
            }
            body.insert(
                "posture".to_string(),
                serde_json::Value::String(posture.clone()),
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Object(body))
                    .into_diagnostic()?
            );
        }
        _ => {
            let width = 44;
            println!("{}", style("Aegis Compliance Posture").bold().underlined());
            println!("{}", "═".repeat(width));

            for (key, heading, cards) in &sections {
                if !section_selected(&args, key) {
                    continue;
                }
                println!();
                println!("{}", style(*heading).bold());
                for card in cards {
                    println!("  {:<22}{}", card.label, format_value(card));
                }
            }

            println!();
            println!("{}", "═".repeat(width));
            let styled = match posture.as_str() {
                "Healthy" => style(posture.clone()).green().bold(),
                "Warning" => style(posture.clone()).yellow().bold(),
                "Critical" => style(posture.clone()).red().bold(),
                _ => style(posture.clone()).dim(),
            };
            println!("Posture: {}", styled);
        }
    }

    Ok(())
}

fn section_selected(args: &StatusArgs, key: &str) -> bool {
    match &args.section {
        Some(section) => section.eq_ignore_ascii_case(key),
        None => true,
    }
}

fn format_value(metric: &SummaryMetric) -> String {
    if metric.value.fract() == 0.0 {
        format!("{}", metric.value as i64)
    } else {
        format!("{:.1}", metric.value)
    }
}

fn is_status(record: &Record, status: &str) -> bool {
    record
        .category("status")
        .is_some_and(|s| s.eq_ignore_ascii_case(status))
}

fn is_severity(record: &Record, severity: &str) -> bool {
    record
        .category("severity")
        .is_some_and(|s| s.eq_ignore_ascii_case(severity))
}

fn risk_cards(records: &[Record], now: NaiveDate) -> Vec<SummaryMetric> {
    let open = aggregate::count_where(records, |r| {
        !risk::TERMINAL_STATUSES
            .iter()
            .any(|terminal| is_status(r, terminal))
    });
    vec![
        SummaryMetric::count("total", aggregate::count(records)),
        SummaryMetric::count("open", open),
        SummaryMetric::count(
            "critical",
            aggregate::count_where(records, |r| is_severity(r, "critical")),
        ),
        SummaryMetric::count(
            "overdue",
            aggregate::overdue_count(records, "due_date", risk::TERMINAL_STATUSES, now),
        ),
        SummaryMetric::measure("avg score", aggregate::average(records, "risk_score")),
    ]
}

fn control_cards(records: &[Record], now: NaiveDate) -> Vec<SummaryMetric> {
    vec![
        SummaryMetric::count("total", aggregate::count(records)),
        SummaryMetric::count(
            "implemented",
            aggregate::count_where(records, |r| is_status(r, "implemented")),
        ),
        SummaryMetric::percent(
            "implemented %",
            aggregate::percentage(records, |r| is_status(r, "implemented")),
        ),
        SummaryMetric::count(
            "assessment overdue",
            aggregate::overdue_count(
                records,
                "next_assessment",
                control::TERMINAL_STATUSES,
                now,
            ),
        ),
        SummaryMetric::measure("avg progress", aggregate::average(records, "progress")),
    ]
}

fn incident_cards(records: &[Record], now: NaiveDate) -> Vec<SummaryMetric> {
    let open = aggregate::count_where(records, |r| {
        !incident::TERMINAL_STATUSES
            .iter()
            .any(|terminal| is_status(r, terminal))
    });
    vec![
        SummaryMetric::count("total", aggregate::count(records)),
        SummaryMetric::count("open", open),
        SummaryMetric::count(
            "critical",
            aggregate::count_where(records, |r| is_severity(r, "critical")),
        ),
        SummaryMetric::count(
            "response overdue",
            aggregate::overdue_count(records, "due_date", incident::TERMINAL_STATUSES, now),
        ),
        SummaryMetric::percent(
            "resolved %",
            aggregate::percentage(records, |r| {
                incident::TERMINAL_STATUSES
                    .iter()
                    .any(|terminal| is_status(r, terminal))
            }),
        ),
    ]
}

fn policy_cards(records: &[Record], now: NaiveDate) -> Vec<SummaryMetric> {
    vec![
        SummaryMetric::count("total", aggregate::count(records)),
        SummaryMetric::count(
            "published",
            aggregate::count_where(records, |r| is_status(r, "published")),
        ),
        SummaryMetric::percent(
            "published %",
            aggregate::percentage(records, |r| is_status(r, "published")),
        ),
        SummaryMetric::count(
            "review overdue",
            aggregate::overdue_count(records, "next_review", policy::TERMINAL_STATUSES, now),
        ),
    ]
}

fn poam_cards(records: &[Record], now: NaiveDate) -> Vec<SummaryMetric> {
    let open = aggregate::count_where(records, |r| {
        !poam::TERMINAL_STATUSES
            .iter()
            .any(|terminal| is_status(r, terminal))
    });
    vec![
        SummaryMetric::count("total", aggregate::count(records)),
        SummaryMetric::count("open", open),
        SummaryMetric::count(
            "overdue",
            aggregate::overdue_count(records, "due_date", poam::TERMINAL_STATUSES, now),
        ),
        SummaryMetric::percent(
            "completed %",
            aggregate::percentage(records, |r| is_status(r, "completed")),
        ),
        SummaryMetric::measure("avg progress", aggregate::average(records, "progress")),
    ]
}

fn calculate_posture(
    risks: &[Record],
    incidents: &[Record],
    poams: &[Record],
    controls: &[Record],
    policies: &[Record],
    now: NaiveDate,
) -> String {
    let overdue = aggregate::overdue_count(risks, "due_date", risk::TERMINAL_STATUSES, now)
        + aggregate::overdue_count(incidents, "due_date", incident::TERMINAL_STATUSES, now)
        + aggregate::overdue_count(poams, "due_date", poam::TERMINAL_STATUSES, now)
        + aggregate::overdue_count(controls, "next_assessment", control::TERMINAL_STATUSES, now)
        + aggregate::overdue_count(policies, "next_review", policy::TERMINAL_STATUSES, now);

    let critical_open = aggregate::count_where(risks, |r| {
        is_severity(r, "critical")
            && !risk::TERMINAL_STATUSES
                .iter()
                .any(|terminal| is_status(r, terminal))
    }) + aggregate::count_where(incidents, |r| {
        is_severity(r, "critical")
            && !incident::TERMINAL_STATUSES
                .iter()
                .any(|terminal| is_status(r, terminal))
    });

    if overdue > 0 && critical_open > 0 {
        "Critical".to_string()
    } else if overdue > 0 || critical_open > 0 {
        "Warning".to_string()
    } else {
        "Healthy".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posture_escalates_with_overdue_criticals() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let clean = calculate_posture(&[], &[], &[], &[], &[], now);
        assert_eq!(clean, "Healthy");

        let overdue_risk = vec![Record::new("RISK-1")
            .with_category("status", "open")
            .with_category("severity", "medium")
            .with_date("due_date", past)];
        assert_eq!(
            calculate_posture(&overdue_risk, &[], &[], &[], &[], now),
            "Warning"
        );

        let critical_overdue = vec![Record::new("RISK-1")
            .with_category("status", "open")
            .with_category("severity", "critical")
            .with_date("due_date", past)];
        assert_eq!(
            calculate_posture(&critical_overdue, &[], &[], &[], &[], now),
            "Critical"
        );
    }

    #[test]
    fn test_cards_on_empty_registers_stay_renderable() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        for card in control_cards(&[], now) {
            assert_eq!(card.value, 0.0);
        }
        for card in poam_cards(&[], now) {
            assert_eq!(card.value, 0.0);
        }
    }
}
