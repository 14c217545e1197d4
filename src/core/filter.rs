//! Filter state and predicate builder
//!
//! A `FilterState` captures the active selections of one view: a search
//! string, categorical equality constraints, and named presets (the "tab"
//! filters such as critical-only or overdue-only). `build` compiles the
//! state into a single predicate over generic records. All active
//! constraints combine with logical AND; a record lacking a constrained
//! field is excluded, never an error.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::core::record::Record;

/// Compiled record predicate
pub type Predicate = Box<dyn Fn(&Record) -> bool>;

/// Sentinel filter value meaning "no constraint on this field"
pub const UNCONSTRAINED: &str = "all";

/// One fixed constraint inside a preset
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Categorical field equals value (case-insensitive)
    CategoryEquals { field: String, value: String },
    /// Numeric field is at least min
    NumberAtLeast { field: String, min: f64 },
    /// Numeric field is at most max
    NumberAtMost { field: String, max: f64 },
    /// Date field is strictly before the cutoff
    DateBefore { field: String, cutoff: NaiveDate },
    /// Date field is in the past and the record's status is not terminal.
    /// A record with no date in this field never matches; a record with no
    /// status is treated as non-terminal and matches when the date is past.
    Overdue {
        field: String,
        terminal_statuses: Vec<String>,
        now: NaiveDate,
    },
}

impl Constraint {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Constraint::CategoryEquals { field, value } => record
                .category(field)
                .is_some_and(|v| v.eq_ignore_ascii_case(value)),
            Constraint::NumberAtLeast { field, min } => {
                record.number(field).is_some_and(|n| n >= *min)
            }
            Constraint::NumberAtMost { field, max } => {
                record.number(field).is_some_and(|n| n <= *max)
            }
            Constraint::DateBefore { field, cutoff } => {
                record.date(field).is_some_and(|d| d < *cutoff)
            }
            Constraint::Overdue {
                field,
                terminal_statuses,
                now,
            } => {
                let Some(date) = record.date(field) else {
                    return false;
                };
                if date >= *now {
                    return false;
                }
                match record.category("status") {
                    Some(status) => !terminal_statuses
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(status)),
                    None => true,
                }
            }
        }
    }
}

/// A named tab preset: a fixed constraint set supplied by the view
#[derive(Debug, Clone)]
pub struct Preset {
    name: String,
    constraints: Vec<Constraint>,
}

impl Preset {
    pub fn new(name: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            name: name.into(),
            constraints,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The active query of one view
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    search: String,
    search_fields: Vec<String>,
    categories: BTreeMap<String, String>,
    presets: Vec<Preset>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text. Empty text matches all records.
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    /// Designate which text fields the search applies to. This is view
    /// configuration, set once per list command.
    pub fn searchable(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add a categorical equality constraint. The value "all" (any casing)
    /// means unconstrained and is ignored.
    pub fn with_category(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.eq_ignore_ascii_case(UNCONSTRAINED) {
            self.categories.insert(field.into(), value);
        }
        self
    }

    /// Add a preset; its constraints AND with everything else
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.presets.push(preset);
        self
    }

    /// Whether any constraint is active
    pub fn is_unconstrained(&self) -> bool {
        self.search.trim().is_empty() && self.categories.is_empty() && self.presets.is_empty()
    }
}

/// Compile a filter state into a single record predicate
pub fn build(state: &FilterState) -> Predicate {
    let search = state.search.trim().to_lowercase();
    let search_fields = state.search_fields.clone();
    let categories: Vec<(String, String)> = state
        .categories
        .iter()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    let presets = state.presets.clone();

    Box::new(move |record: &Record| {
        if !search.is_empty() {
            let hit = search_fields.iter().any(|field| {
                record
                    .text(field)
                    .is_some_and(|v| v.to_lowercase().contains(&search))
            });
            if !hit {
                return false;
            }
        }

        for (field, value) in &categories {
            let matched = record
                .category(field)
                .is_some_and(|v| v.eq_ignore_ascii_case(value));
            if !matched {
                return false;
            }
        }

        presets
            .iter()
            .all(|preset| preset.constraints.iter().all(|c| c.matches(record)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(id: &str, title: &str, severity: &str, status: &str) -> Record {
        Record::new(id)
            .with_text("title", title)
            .with_text("description", "placeholder")
            .with_category("severity", severity)
            .with_category("status", status)
    }

    #[test]
    fn test_empty_state_matches_everything() {
        let predicate = build(&FilterState::new().searchable(&["title"]));
        assert!(predicate(&risk("RISK-1", "Stolen laptop", "high", "open")));
        assert!(predicate(&Record::new("CTRL-1")));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let state = FilterState::new()
            .with_search("LAPTOP")
            .searchable(&["title", "description"]);
        let predicate = build(&state);
        assert!(predicate(&risk("RISK-1", "Stolen laptop", "high", "open")));
        assert!(!predicate(&risk("RISK-2", "Phishing wave", "high", "open")));
    }

    #[test]
    fn test_search_only_covers_designated_fields() {
        let state = FilterState::new().with_search("open").searchable(&["title"]);
        let predicate = build(&state);
        // "open" appears in the status category, not in the title
        assert!(!predicate(&risk("RISK-1", "Stolen laptop", "high", "open")));
    }

    #[test]
    fn test_category_equality_ignores_case() {
        let state = FilterState::new().with_category("severity", "Critical");
        let predicate = build(&state);
        assert!(predicate(&risk("RISK-1", "a", "critical", "open")));
        assert!(predicate(&risk("RISK-2", "b", "CRITICAL", "open")));
        assert!(!predicate(&risk("RISK-3", "c", "high", "open")));
    }

    #[test]
    fn test_all_sentinel_means_unconstrained() {
        let state = FilterState::new().with_category("severity", "all");
        assert!(state.is_unconstrained());
        let predicate = build(&state);
        assert!(predicate(&risk("RISK-1", "a", "low", "open")));
    }

    #[test]
    fn test_missing_field_excludes_record() {
        let state = FilterState::new().with_category("severity", "high");
        let predicate = build(&state);
        assert!(!predicate(&Record::new("POL-1")));
    }

    #[test]
    fn test_constraints_combine_with_and() {
        let state = FilterState::new()
            .with_search("laptop")
            .searchable(&["title"])
            .with_category("severity", "high")
            .with_category("status", "open");
        let predicate = build(&state);
        assert!(predicate(&risk("RISK-1", "Stolen laptop", "high", "open")));
        assert!(!predicate(&risk("RISK-2", "Stolen laptop", "high", "closed")));
        assert!(!predicate(&risk("RISK-3", "Stolen laptop", "low", "open")));
    }

    #[test]
    fn test_preset_ands_with_explicit_filters() {
        let critical = Preset::new(
            "critical",
            vec![Constraint::CategoryEquals {
                field: "severity".into(),
                value: "critical".into(),
            }],
        );
        // A redundant explicit severity filter must not change the result set
        let with_both = build(
            &FilterState::new()
                .with_preset(critical.clone())
                .with_category("severity", "Critical"),
        );
        let preset_only = build(&FilterState::new().with_preset(critical));

        let records = vec![
            risk("RISK-1", "a", "critical", "open"),
            risk("RISK-2", "b", "high", "open"),
            risk("RISK-3", "c", "Critical", "closed"),
        ];
        let both: Vec<&str> = records.iter().filter(|r| with_both(r)).map(|r| r.id()).collect();
        let only: Vec<&str> = records.iter().filter(|r| preset_only(r)).map(|r| r.id()).collect();
        assert_eq!(both, only);
        assert_eq!(both, vec!["RISK-1", "RISK-3"]);
    }

    #[test]
    fn test_overdue_constraint_exempts_terminal_statuses() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let overdue = Constraint::Overdue {
            field: "due_date".into(),
            terminal_statuses: vec!["completed".into(), "closed".into()],
            now,
        };

        let open = risk("RISK-1", "a", "high", "open").with_date("due_date", due);
        let completed = risk("RISK-2", "b", "high", "Completed").with_date("due_date", due);
        let undated = risk("RISK-3", "c", "high", "open");

        assert!(overdue.matches(&open));
        assert!(!overdue.matches(&completed));
        assert!(!overdue.matches(&undated));
    }

    #[test]
    fn test_predicate_is_idempotent() {
        let state = FilterState::new().with_category("status", "open");
        let predicate = build(&state);
        let records = vec![
            risk("RISK-1", "a", "high", "open"),
            risk("RISK-2", "b", "high", "closed"),
        ];
        let first: Vec<&Record> = records.iter().filter(|r| predicate(r)).collect();
        let second: Vec<&Record> = first.iter().copied().filter(|r| predicate(r)).collect();
        assert_eq!(first, second);
    }
}
