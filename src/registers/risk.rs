//! Risk register entry type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{Record, RegisterEntry};
use crate::registers::Severity;

/// Statuses that exempt a risk from being considered overdue
pub const TERMINAL_STATUSES: &[&str] = &["mitigated", "accepted", "closed"];

/// Risk category - where the risk originates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum RiskCategory {
    #[default]
    Operational,
    Technical,
    Compliance,
    Financial,
    ThirdParty,
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskCategory::Operational => write!(f, "operational"),
            RiskCategory::Technical => write!(f, "technical"),
            RiskCategory::Compliance => write!(f, "compliance"),
            RiskCategory::Financial => write!(f, "financial"),
            RiskCategory::ThirdParty => write!(f, "third_party"),
        }
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "operational" => Ok(RiskCategory::Operational),
            "technical" => Ok(RiskCategory::Technical),
            "compliance" => Ok(RiskCategory::Compliance),
            "financial" => Ok(RiskCategory::Financial),
            "third_party" | "third-party" => Ok(RiskCategory::ThirdParty),
            _ => Err(format!("Unknown risk category: {}", s)),
        }
    }
}

/// Risk lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum RiskStatus {
    #[default]
    Open,
    InProgress,
    Mitigated,
    Accepted,
    Closed,
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskStatus::Open => write!(f, "open"),
            RiskStatus::InProgress => write!(f, "in_progress"),
            RiskStatus::Mitigated => write!(f, "mitigated"),
            RiskStatus::Accepted => write!(f, "accepted"),
            RiskStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A risk register entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    /// Unique identifier
    pub id: RecordId,

    /// Short title
    pub title: String,

    /// Detailed description of the risk
    pub description: String,

    /// Risk category
    #[serde(default)]
    pub category: RiskCategory,

    /// Assessed severity
    #[serde(default)]
    pub severity: Severity,

    /// Current status
    #[serde(default)]
    pub status: RiskStatus,

    /// Likelihood rating 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<u8>,

    /// Impact rating 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<u8>,

    /// Risk score = likelihood x impact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,

    /// Person accountable for the risk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// When the risk was identified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified: Option<NaiveDate>,

    /// Target date for mitigation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Last review date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<NaiveDate>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this risk)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Risk {
    /// Create a new risk with defaults
    pub fn new(title: String, description: String, author: String) -> Self {
        Self {
            id: RecordId::new(RecordKind::Risk),
            title,
            description,
            category: RiskCategory::default(),
            severity: Severity::default(),
            status: RiskStatus::default(),
            likelihood: None,
            impact: None,
            risk_score: None,
            owner: None,
            tags: Vec::new(),
            identified: None,
            due_date: None,
            last_reviewed: None,
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Score computed from likelihood x impact, if both ratings are set
    pub fn computed_score(&self) -> Option<u8> {
        match (self.likelihood, self.impact) {
            (Some(l), Some(i)) => Some(l * i),
            _ => None,
        }
    }

    /// Effective score: computed when possible, stored value otherwise
    pub fn score(&self) -> Option<u8> {
        self.computed_score().or(self.risk_score)
    }

    /// Whether the stored score disagrees with the computed one
    pub fn is_score_stale(&self) -> bool {
        match (self.computed_score(), self.risk_score) {
            (Some(computed), Some(stored)) => computed != stored,
            _ => false,
        }
    }
}

impl RegisterEntry for Risk {
    const KIND: RecordKind = RecordKind::Risk;

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
            .with_number("severity_rank", self.severity as u8 as f64);

        if !self.tags.is_empty() {
            record = record.with_text("tags", self.tags.join(" "));
        }
        if let Some(ref owner) = self.owner {
            record = record.with_category("owner", owner);
        }
        if let Some(likelihood) = self.likelihood {
            record = record.with_number("likelihood", likelihood as f64);
        }
        if let Some(impact) = self.impact {
            record = record.with_number("impact", impact as f64);
        }
        if let Some(score) = self.score() {
            record = record.with_number("risk_score", score as f64);
        }
        if let Some(identified) = self.identified {
            record = record.with_date("identified", identified);
        }
        if let Some(due) = self.due_date {
            record = record.with_date("due_date", due);
        }
        if let Some(reviewed) = self.last_reviewed {
            record = record.with_date("last_reviewed", reviewed);
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk() -> Risk {
        Risk::new(
            "Unpatched VPN concentrator".to_string(),
            "Vendor patches lag behind disclosure".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_score_computed_from_ratings() {
        let mut r = risk();
        r.likelihood = Some(4);
        r.impact = Some(5);
        assert_eq!(r.score(), Some(20));
    }

    #[test]
    fn test_score_falls_back_to_stored() {
        let mut r = risk();
        r.risk_score = Some(12);
        assert_eq!(r.computed_score(), None);
        assert_eq!(r.score(), Some(12));
    }

    #[test]
    fn test_is_score_stale_detects_mismatch() {
        let mut r = risk();
        r.likelihood = Some(4);
        r.impact = Some(5);
        r.risk_score = Some(12);
        assert!(r.is_score_stale());

        r.risk_score = Some(20);
        assert!(!r.is_score_stale());
    }

    #[test]
    fn test_to_record_maps_fields() {
        let mut r = risk();
        r.severity = Severity::Critical;
        r.likelihood = Some(4);
        r.impact = Some(5);
        r.due_date = NaiveDate::from_ymd_opt(2024, 1, 5);

        let record = r.to_record();
        assert_eq!(record.category("kind"), Some("risk"));
        assert_eq!(record.category("severity"), Some("critical"));
        assert_eq!(record.category("status"), Some("open"));
        assert_eq!(record.number("risk_score"), Some(20.0));
        assert_eq!(record.date("due_date"), r.due_date);
        // Unset optional fields stay absent rather than defaulting
        assert_eq!(record.category("owner"), None);
        assert_eq!(record.date("last_reviewed"), None);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut r = risk();
        r.owner = Some("mina".to_string());
        let yaml = serde_yml::to_string(&r).unwrap();
        let back: Risk = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back.id, r.id);
        assert_eq!(back.owner.as_deref(), Some("mina"));
        assert_eq!(back.status, RiskStatus::Open);
    }
}
