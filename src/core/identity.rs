//! Record identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Record collection kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    /// Risk register entry
    Risk,
    /// Control catalog entry
    Ctrl,
    /// Incident log entry
    Inc,
    /// Policy library entry
    Pol,
    /// Plan of action & milestones entry
    Poam,
}

impl RecordKind {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Risk => "RISK",
            RecordKind::Ctrl => "CTRL",
            RecordKind::Inc => "INC",
            RecordKind::Pol => "POL",
            RecordKind::Poam => "POAM",
        }
    }

    /// Directory name holding this kind's records under the project root
    pub fn dir_name(&self) -> &'static str {
        match self {
            RecordKind::Risk => "risks",
            RecordKind::Ctrl => "controls",
            RecordKind::Inc => "incidents",
            RecordKind::Pol => "policies",
            RecordKind::Poam => "poams",
        }
    }

    /// Human-readable collection label, used in search output and reports
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Risk => "risk",
            RecordKind::Ctrl => "control",
            RecordKind::Inc => "incident",
            RecordKind::Pol => "policy",
            RecordKind::Poam => "poam",
        }
    }

    /// Get all record kinds
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::Risk,
            RecordKind::Ctrl,
            RecordKind::Inc,
            RecordKind::Pol,
            RecordKind::Poam,
        ]
    }

    /// Try to determine the kind from a filename like "RISK-xxx.yaml"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        Self::all()
            .iter()
            .find(|kind| upper.starts_with(&format!("{}-", kind.as_str())))
            .copied()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RISK" => Ok(RecordKind::Risk),
            "CTRL" => Ok(RecordKind::Ctrl),
            "INC" => Ok(RecordKind::Inc),
            "POL" => Ok(RecordKind::Pol),
            "POAM" => Ok(RecordKind::Poam),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique record identifier combining a kind prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    kind: RecordKind,
    ulid: Ulid,
}

impl RecordId {
    /// Create a new RecordId with the given kind
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            ulid: Ulid::new(),
        }
    }

    /// Create a RecordId from a kind and existing ULID
    pub fn from_parts(kind: RecordKind, ulid: Ulid) -> Self {
        Self { kind, ulid }
    }

    /// Get the record kind
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse a RecordId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.ulid)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let kind = kind_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { kind, ulid })
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: RISK, CTRL, INC, POL, POAM)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_generation() {
        let id = RecordId::new(RecordKind::Risk);
        assert!(id.to_string().starts_with("RISK-"));
        assert_eq!(id.to_string().len(), 31); // RISK- (5) + ULID (26) = 31
    }

    #[test]
    fn test_record_id_roundtrip() {
        let original = RecordId::new(RecordKind::Poam);
        let parsed = RecordId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
        assert_eq!(parsed.kind(), RecordKind::Poam);
    }

    #[test]
    fn test_record_id_invalid_prefix() {
        let err = RecordId::parse("XXX-01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_record_id_missing_delimiter() {
        let err = RecordId::parse("RISK01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_record_id_invalid_ulid() {
        let err = RecordId::parse("RISK-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_kinds_parse() {
        for kind in RecordKind::all() {
            let id = RecordId::new(*kind);
            let parsed = RecordId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.kind(), *kind);
        }
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(
            RecordKind::from_filename("RISK-01HQ3K4N5M6P7R8S9T0VWXYZAB.yaml"),
            Some(RecordKind::Risk)
        );
        assert_eq!(RecordKind::from_filename("notes.yaml"), None);
    }
}
