//! Policy library entry type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{Record, RegisterEntry};

/// Statuses that exempt a policy from review-overdue checks
pub const TERMINAL_STATUSES: &[&str] = &["retired"];

/// Policy lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum PolicyStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Published,
    Retired,
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyStatus::Draft => write!(f, "draft"),
            PolicyStatus::InReview => write!(f, "in_review"),
            PolicyStatus::Approved => write!(f, "approved"),
            PolicyStatus::Published => write!(f, "published"),
            PolicyStatus::Retired => write!(f, "retired"),
        }
    }
}

impl std::str::FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PolicyStatus::Draft),
            "in_review" => Ok(PolicyStatus::InReview),
            "approved" => Ok(PolicyStatus::Approved),
            "published" => Ok(PolicyStatus::Published),
            "retired" => Ok(PolicyStatus::Retired),
            _ => Err(format!("Unknown policy status: {}", s)),
        }
    }
}

/// A policy library entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique identifier
    pub id: RecordId,

    /// Short title
    pub title: String,

    /// Scope and intent of the policy
    pub description: String,

    /// Current status
    #[serde(default)]
    pub status: PolicyStatus,

    /// Document version
    #[serde(default = "default_version")]
    pub version: String,

    /// Person accountable for the policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Date the current version took effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<NaiveDate>,

    /// When the next review is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<NaiveDate>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this policy)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_revision() -> u32 {
    1
}

impl Policy {
    /// Create a new policy with defaults
    pub fn new(title: String, description: String, author: String) -> Self {
        Self {
            id: RecordId::new(RecordKind::Pol),
            title,
            description,
            status: PolicyStatus::default(),
            version: default_version(),
            owner: None,
            tags: Vec::new(),
            effective: None,
            next_review: None,
            created: Utc::now(),
            author,
            revision: 1,
        }
    }
}

impl RegisterEntry for Policy {
    const KIND: RecordKind = RecordKind::Pol;

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
            .with_text("version", &self.version)
            .with_category("kind", Self::KIND.label())
            .with_category("status", self.status.to_string());

        if !self.tags.is_empty() {
            record = record.with_text("tags", self.tags.join(" "));
        }
        if let Some(ref owner) = self.owner {
            record = record.with_category("owner", owner);
        }
        if let Some(effective) = self.effective {
            record = record.with_date("effective", effective);
        }
        if let Some(review) = self.next_review {
            record = record.with_date("next_review", review);
        }

        record
    }
}
