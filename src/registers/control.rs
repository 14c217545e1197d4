//! Control catalog entry type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{Record, RegisterEntry};

/// Statuses that exempt a control from assessment-overdue checks.
/// Implemented controls still need periodic reassessment, so only
/// not-applicable is exempt.
pub const TERMINAL_STATUSES: &[&str] = &["not_applicable"];

/// Control family - which part of the program the control belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFamily {
    AccessControl,
    AuditAccountability,
    ConfigurationManagement,
    IdentityAuthentication,
    IncidentResponse,
    RiskAssessment,
    SystemIntegrity,
}

impl std::fmt::Display for ControlFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlFamily::AccessControl => write!(f, "access_control"),
            ControlFamily::AuditAccountability => write!(f, "audit_accountability"),
            ControlFamily::ConfigurationManagement => write!(f, "configuration_management"),
            ControlFamily::IdentityAuthentication => write!(f, "identity_authentication"),
            ControlFamily::IncidentResponse => write!(f, "incident_response"),
            ControlFamily::RiskAssessment => write!(f, "risk_assessment"),
            ControlFamily::SystemIntegrity => write!(f, "system_integrity"),
        }
    }
}

impl std::str::FromStr for ControlFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "access_control" | "access-control" => Ok(ControlFamily::AccessControl),
            "audit_accountability" | "audit-accountability" => {
                Ok(ControlFamily::AuditAccountability)
            }
            "configuration_management" | "configuration-management" => {
                Ok(ControlFamily::ConfigurationManagement)
            }
            "identity_authentication" | "identity-authentication" => {
                Ok(ControlFamily::IdentityAuthentication)
            }
            "incident_response" | "incident-response" => Ok(ControlFamily::IncidentResponse),
            "risk_assessment" | "risk-assessment" => Ok(ControlFamily::RiskAssessment),
            "system_integrity" | "system-integrity" => Ok(ControlFamily::SystemIntegrity),
            _ => Err(format!("Unknown control family: {}", s)),
        }
    }
}

/// Implementation status of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ImplementationStatus {
    #[default]
    NotImplemented,
    Planned,
    PartiallyImplemented,
    Implemented,
    NotApplicable,
}

impl std::fmt::Display for ImplementationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImplementationStatus::NotImplemented => write!(f, "not_implemented"),
            ImplementationStatus::Planned => write!(f, "planned"),
            ImplementationStatus::PartiallyImplemented => write!(f, "partially_implemented"),
            ImplementationStatus::Implemented => write!(f, "implemented"),
            ImplementationStatus::NotApplicable => write!(f, "not_applicable"),
        }
    }
}

/// A control catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    /// Unique identifier
    pub id: RecordId,

    /// Short title
    pub title: String,

    /// What the control does and how it is operated
    pub description: String,

    /// Control family
    pub family: ControlFamily,

    /// External framework reference (e.g., "NIST SP 800-53 AC-2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Implementation status
    #[serde(default)]
    pub implementation: ImplementationStatus,

    /// Implementation progress 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    /// Person accountable for the control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Date of the most recent assessment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_assessed: Option<NaiveDate>,

    /// When the next assessment is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_assessment: Option<NaiveDate>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this control)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Control {
    /// Create a new control with defaults
    pub fn new(
        title: String,
        description: String,
        family: ControlFamily,
        author: String,
    ) -> Self {
        Self {
            id: RecordId::new(RecordKind::Ctrl),
            title,
            description,
            family,
            reference: None,
            implementation: ImplementationStatus::default(),
            progress: None,
            owner: None,
            tags: Vec::new(),
            last_assessed: None,
            next_assessment: None,
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Whether the control counts toward the implemented percentage
    pub fn is_implemented(&self) -> bool {
        self.implementation == ImplementationStatus::Implemented
    }
}

impl RegisterEntry for Control {
    const KIND: RecordKind = RecordKind::Ctrl;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status_name(&self) -> String {
        self.implementation.to_string()
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new(self.id.to_string())
            .with_text("title", &self.title)
            .with_text("description", &self.description)
            .with_category("kind", Self::KIND.label())
            .with_category("family", self.family.to_string())
            .with_category("status", self.implementation.to_string());

        if let Some(ref reference) = self.reference {
            record = record.with_text("reference", reference);
        }
        if !self.tags.is_empty() {
            record = record.with_text("tags", self.tags.join(" "));
        }
        if let Some(ref owner) = self.owner {
            record = record.with_category("owner", owner);
        }
        if let Some(progress) = self.progress {
            record = record.with_number("progress", progress);
        }
        if let Some(assessed) = self.last_assessed {
            record = record.with_date("last_assessed", assessed);
        }
        if let Some(next) = self.next_assessment {
            record = record.with_date("next_assessment", next);
        }

        record
    }
}
