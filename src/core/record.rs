//! Generic record shape shared by every register
//!
//! Each register keeps its own typed struct (see `crate::registers`), but
//! filtering, querying, and aggregation operate on this generic form: an id
//! plus four typed field maps. One filter/query/aggregate implementation
//! then serves every collection regardless of which optional fields a given
//! register defines.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::identity::{RecordId, RecordKind};

/// One domain item (risk, control, incident, policy, POA&M) in generic form.
///
/// Field maps are keyed by field name. Text fields participate in substring
/// search, categorical fields in equality filters, numeric and date fields
/// in aggregation. Fields are optional per record: a record simply omits
/// entries for fields it does not define.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: String,
    text: BTreeMap<String, String>,
    categories: BTreeMap<String, String>,
    numbers: BTreeMap<String, f64>,
    dates: BTreeMap<String, NaiveDate>,
}

impl Record {
    /// Create an empty record with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: BTreeMap::new(),
            categories: BTreeMap::new(),
            numbers: BTreeMap::new(),
            dates: BTreeMap::new(),
        }
    }

    /// Get the record id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a text field (builder style)
    pub fn with_text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.insert(field.into(), value.into());
        self
    }

    /// Add a categorical field (builder style)
    pub fn with_category(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.categories.insert(field.into(), value.into());
        self
    }

    /// Add a numeric field (builder style)
    pub fn with_number(mut self, field: impl Into<String>, value: f64) -> Self {
        self.numbers.insert(field.into(), value);
        self
    }

    /// Add a date field (builder style)
    pub fn with_date(mut self, field: impl Into<String>, value: NaiveDate) -> Self {
        self.dates.insert(field.into(), value);
        self
    }

    /// Look up a text field
    pub fn text(&self, field: &str) -> Option<&str> {
        self.text.get(field).map(String::as_str)
    }

    /// Look up a categorical field
    pub fn category(&self, field: &str) -> Option<&str> {
        self.categories.get(field).map(String::as_str)
    }

    /// Look up a numeric field
    pub fn number(&self, field: &str) -> Option<f64> {
        self.numbers.get(field).copied()
    }

    /// Look up a date field
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.dates.get(field).copied()
    }
}

/// Common interface for all register entry types
pub trait RegisterEntry: Serialize + DeserializeOwned + 'static {
    /// The collection this entry type belongs to
    const KIND: RecordKind;

    /// Get the entry's unique ID
    fn id(&self) -> &RecordId;

    /// Get the entry's title
    fn title(&self) -> &str;

    /// Get the entry's status as its canonical lowercase name
    fn status_name(&self) -> String;

    /// Convert the typed entry into the generic record form.
    ///
    /// Implementations put the collection kind under the "kind" category so
    /// cross-register queries can constrain on it.
    fn to_record(&self) -> Record;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_field_lookup() {
        let record = Record::new("RISK-1")
            .with_text("title", "Unpatched VPN concentrator")
            .with_category("severity", "critical")
            .with_number("risk_score", 20.0)
            .with_date("due_date", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());

        assert_eq!(record.id(), "RISK-1");
        assert_eq!(record.text("title"), Some("Unpatched VPN concentrator"));
        assert_eq!(record.category("severity"), Some("critical"));
        assert_eq!(record.number("risk_score"), Some(20.0));
        assert_eq!(
            record.date("due_date"),
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
    }

    #[test]
    fn test_record_missing_fields_are_none() {
        let record = Record::new("CTRL-1");
        assert_eq!(record.text("title"), None);
        assert_eq!(record.category("status"), None);
        assert_eq!(record.number("progress"), None);
        assert_eq!(record.date("next_assessment"), None);
    }
}
