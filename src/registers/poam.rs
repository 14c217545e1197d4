//! Plan of action & milestones (POA&M) entry type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{Record, RegisterEntry};
use crate::registers::Severity;

/// Statuses that exempt a POA&M from being considered overdue
pub const TERMINAL_STATUSES: &[&str] = &["completed", "risk_accepted"];

/// POA&M lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum PoamStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    RiskAccepted,
}

impl std::fmt::Display for PoamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoamStatus::Open => write!(f, "open"),
            PoamStatus::InProgress => write!(f, "in_progress"),
            PoamStatus::Completed => write!(f, "completed"),
            PoamStatus::RiskAccepted => write!(f, "risk_accepted"),
        }
    }
}

/// A POA&M register entry tracking one remediation effort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poam {
    /// Unique identifier
    pub id: RecordId,

    /// The weakness being remediated
    pub title: String,

    /// Remediation plan
    pub description: String,

    /// Assessed severity of the weakness
    #[serde(default)]
    pub severity: Severity,

    /// Current status
    #[serde(default)]
    pub status: PoamStatus,

    /// Remediation progress 0-100
    #[serde(default)]
    pub progress: f64,

    /// Scheduled completion date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Originating finding or audit reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Person accountable for the remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this entry)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Poam {
    /// Create a new POA&M entry with defaults
    pub fn new(title: String, description: String, author: String) -> Self {
        Self {
            id: RecordId::new(RecordKind::Poam),
            title,
            description,
            severity: Severity::default(),
            status: PoamStatus::default(),
            progress: 0.0,
            due_date: None,
            source: None,
            owner: None,
            tags: Vec::new(),
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Whether the stored progress lies in the valid [0, 100] range
    pub fn progress_in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.progress)
    }
}

impl RegisterEntry for Poam {
    const KIND: RecordKind = RecordKind::Poam;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status_name(&self) -> String {
        self.status.to_string()
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(self.id.to_string())
            .with_text("title", &self.title)
            .with_text("description", &self.description)
            .with_category("kind", Self::KIND.label())
            .with_category("severity", self.severity.to_string())
            .with_category("status", self.status.to_string())
            .with_number("severity_rank", self.severity as u8 as f64)
            .with_number("progress", self.progress);

        if let Some(ref source) = self.source {
            record = record.with_text("source", source);
        }
        if !self.tags.is_empty() {
            record = record.with_text("tags", self.tags.join(" "));
        }
        if let Some(ref owner) = self.owner {
            record = record.with_category("owner", owner);
        }
        if let Some(due) = self.due_date {
            record = record.with_date("due_date", due);
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_range_check() {
        let mut poam = Poam::new(
            "Disable legacy TLS".to_string(),
            "Retire TLS 1.0 endpoints".to_string(),
            "test".to_string(),
        );
        assert!(poam.progress_in_range());
        poam.progress = 100.0;
        assert!(poam.progress_in_range());
        poam.progress = 120.0;
        assert!(!poam.progress_in_range());
    }

    #[test]
    fn test_to_record_always_carries_progress() {
        let poam = Poam::new(
            "Rotate shared secrets".to_string(),
            "Move to per-service credentials".to_string(),
            "test".to_string(),
        );
        let record = poam.to_record();
        assert_eq!(record.number("progress"), Some(0.0));
        assert_eq!(record.category("status"), Some("open"));
        assert_eq!(record.category("kind"), Some("poam"));
    }
}
