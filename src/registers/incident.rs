//! Incident log entry type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{Record, RegisterEntry};
use crate::registers::Severity;

/// Statuses that exempt an incident from response-overdue checks
pub const TERMINAL_STATUSES: &[&str] = &["resolved", "closed"];

/// Incident category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum IncidentCategory {
    Phishing,
    Malware,
    DataExposure,
    Availability,
    AccessMisuse,
    #[default]
    Other,
}

impl std::fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentCategory::Phishing => write!(f, "phishing"),
            IncidentCategory::Malware => write!(f, "malware"),
            IncidentCategory::DataExposure => write!(f, "data_exposure"),
            IncidentCategory::Availability => write!(f, "availability"),
            IncidentCategory::AccessMisuse => write!(f, "access_misuse"),
            IncidentCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phishing" => Ok(IncidentCategory::Phishing),
            "malware" => Ok(IncidentCategory::Malware),
            "data_exposure" | "data-exposure" => Ok(IncidentCategory::DataExposure),
            "availability" => Ok(IncidentCategory::Availability),
            "access_misuse" | "access-misuse" => Ok(IncidentCategory::AccessMisuse),
            "other" => Ok(IncidentCategory::Other),
            _ => Err(format!("Unknown incident category: {}", s)),
        }
    }
}

/// Incident lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum IncidentStatus {
    #[default]
    Open,
    Investigating,
    Contained,
    Resolved,
    Closed,
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentStatus::Open => write!(f, "open"),
            IncidentStatus::Investigating => write!(f, "investigating"),
            IncidentStatus::Contained => write!(f, "contained"),
            IncidentStatus::Resolved => write!(f, "resolved"),
            IncidentStatus::Closed => write!(f, "closed"),
        }
    }
}

/// An incident log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier
    pub id: RecordId,

    /// Short title
    pub title: String,

    /// What happened and what was affected
    pub description: String,

    /// Incident category
    #[serde(default)]
    pub category: IncidentCategory,

    /// Assessed severity
    #[serde(default)]
    pub severity: Severity,

    /// Current status
    #[serde(default)]
    pub status: IncidentStatus,

    /// When the incident was detected
    pub detected: NaiveDate,

    /// When the incident was resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<NaiveDate>,

    /// Response deadline from the incident SLA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_due: Option<NaiveDate>,

    /// Person leading the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who logged this incident)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Incident {
    /// Create a new incident with defaults, detected today
    pub fn new(title: String, description: String, author: String) -> Self {
        Self {
            id: RecordId::new(RecordKind::Inc),
            title,
            description,
            category: IncidentCategory::default(),
            severity: Severity::default(),
            status: IncidentStatus::default(),
            detected: Utc::now().date_naive(),
            resolved: None,
            response_due: None,
            assignee: None,
            tags: Vec::new(),
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Days from detection to resolution, if resolved
    pub fn resolution_days(&self) -> Option<i64> {
        self.resolved
            .map(|resolved| (resolved - self.detected).num_days())
    }
}

impl RegisterEntry for Incident {
    const KIND: RecordKind = RecordKind::Inc;

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
            .with_category("category", self.category.to_string())
            .with_category("severity", self.severity.to_string())
            .with_category("status", self.status.to_string())
            .with_number("severity_rank", self.severity as u8 as f64)
            .with_date("detected", self.detected);

        if !self.tags.is_empty() {
            record = record.with_text("tags", self.tags.join(" "));
        }
        if let Some(ref assignee) = self.assignee {
            record = record.with_category("owner", assignee);
        }
        if let Some(resolved) = self.resolved {
            record = record.with_date("resolved", resolved);
        }
        if let Some(due) = self.response_due {
            record = record.with_date("due_date", due);
        }
        if let Some(days) = self.resolution_days() {
            record = record.with_number("resolution_days", days as f64);
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_days() {
        let mut incident = Incident::new(
            "Credential stuffing against SSO".to_string(),
            "Burst of failed logins from one ASN".to_string(),
            "test".to_string(),
        );
        incident.detected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(incident.resolution_days(), None);

        incident.resolved = NaiveDate::from_ymd_opt(2024, 3, 8);
        assert_eq!(incident.resolution_days(), Some(7));
    }

    #[test]
    fn test_to_record_maps_response_due_as_due_date() {
        let mut incident = Incident::new(
            "Lost badge".to_string(),
            "Contractor badge unaccounted for".to_string(),
            "test".to_string(),
        );
        incident.response_due = NaiveDate::from_ymd_opt(2024, 4, 1);

        let record = incident.to_record();
        assert_eq!(record.category("kind"), Some("incident"));
        assert_eq!(record.date("due_date"), incident.response_due);
        assert_eq!(record.date("detected"), Some(incident.detected));
    }
}
