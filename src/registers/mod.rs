//! Register type definitions
//!
//! Aegis manages five record collections:
//!
//! - [`Risk`] - Risk register entries with likelihood/impact scoring
//! - [`Control`] - Control catalog entries with implementation tracking
//! - [`Incident`] - Incident log entries with response tracking
//! - [`Policy`] - Policy library entries with review cycles
//! - [`Poam`] - Plan of action & milestones entries for remediation work
//!
//! Each type is a plain serde struct stored as one YAML file per record,
//! and converts into the generic [`crate::core::Record`] form through
//! [`crate::core::RegisterEntry`] so the filter/query/aggregate core serves
//! every collection with one implementation.

pub mod control;
pub mod incident;
pub mod poam;
pub mod policy;
pub mod risk;

pub use control::Control;
pub use incident::Incident;
pub use poam::Poam;
pub use policy::Policy;
pub use risk::Risk;

use serde::{Deserialize, Serialize};

/// Severity scale shared by risks, incidents, and POA&Ms
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}
