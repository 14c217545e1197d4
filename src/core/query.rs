//! Query engine - predicate application with optional stable sort
//!
//! Applies a compiled predicate to a record store and materializes the
//! matching records. Register sizes are small (low hundreds), so every call
//! is a fresh O(n) pass; there is deliberately no incremental index.

use std::cmp::Ordering;

use crate::core::filter::Predicate;
use crate::core::record::Record;
use crate::core::store::RecordStore;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Which field to order by
#[derive(Debug, Clone)]
pub enum SortKey {
    /// The record id itself
    Id,
    /// A text field, compared case-insensitively
    Text(String),
    /// A categorical field, compared case-insensitively
    Category(String),
    /// A numeric field
    Number(String),
    /// A date field
    Date(String),
}

impl SortKey {
    /// Compare two records under this key. Records missing the keyed field
    /// order after all records that have it, regardless of direction;
    /// direction applies only between records that both define the key.
    fn compare(&self, a: &Record, b: &Record, order: SortOrder) -> Ordering {
        match self {
            SortKey::Id => apply(a.id().cmp(b.id()), order),
            SortKey::Text(field) => cmp_option(
                a.text(field).map(str::to_lowercase),
                b.text(field).map(str::to_lowercase),
                order,
            ),
            SortKey::Category(field) => cmp_option(
                a.category(field).map(str::to_lowercase),
                b.category(field).map(str::to_lowercase),
                order,
            ),
            SortKey::Number(field) => match (a.number(field), b.number(field)) {
                (Some(x), Some(y)) => {
                    apply(x.partial_cmp(&y).unwrap_or(Ordering::Equal), order)
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Date(field) => cmp_option(a.date(field), b.date(field), order),
        }
    }
}

fn apply(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

fn cmp_option<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => apply(x.cmp(&y), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Apply a predicate to the store, producing the matching records.
///
/// Without a sort key the result keeps insertion order. With one, the sort
/// is stable: ties keep their original insertion order. The store is never
/// mutated; re-invoking with a different predicate is always safe.
pub fn query(
    store: &RecordStore,
    predicate: &Predicate,
    sort: Option<&SortKey>,
    order: SortOrder,
) -> Vec<Record> {
    let mut results: Vec<Record> = store
        .all()
        .iter()
        .filter(|r| predicate(r))
        .cloned()
        .collect();

    if let Some(key) = sort {
        results.sort_by(|a, b| key.compare(a, b, order));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{build, FilterState};
    use chrono::NaiveDate;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            Record::new("POAM-3")
                .with_text("title", "Patch backlog")
                .with_category("status", "open")
                .with_number("progress", 40.0),
            Record::new("POAM-1")
                .with_text("title", "MFA rollout")
                .with_category("status", "completed")
                .with_number("progress", 100.0)
                .with_date("due_date", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            Record::new("POAM-2")
                .with_text("title", "Log retention")
                .with_category("status", "open")
                .with_number("progress", 40.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_unconstrained_query_is_identity() {
        let store = store();
        let predicate = build(&FilterState::new().searchable(&["title"]));
        let results = query(&store, &predicate, None, SortOrder::Ascending);
        let ids: Vec<&str> = results.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["POAM-3", "POAM-1", "POAM-2"]);
    }

    #[test]
    fn test_stable_sort_breaks_ties_by_insertion_order() {
        let store = store();
        let predicate = build(&FilterState::new());
        let results = query(
            &store,
            &predicate,
            Some(&SortKey::Number("progress".into())),
            SortOrder::Ascending,
        );
        let ids: Vec<&str> = results.iter().map(|r| r.id()).collect();
        // POAM-3 and POAM-2 tie on progress; insertion order decides
        assert_eq!(ids, vec!["POAM-3", "POAM-2", "POAM-1"]);
    }

    #[test]
    fn test_descending_sort() {
        let store = store();
        let predicate = build(&FilterState::new());
        let results = query(
            &store,
            &predicate,
            Some(&SortKey::Text("title".into())),
            SortOrder::Descending,
        );
        let ids: Vec<&str> = results.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["POAM-3", "POAM-1", "POAM-2"]);
    }

    #[test]
    fn test_records_missing_sort_field_go_last() {
        let store = store();
        let predicate = build(&FilterState::new());
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let results = query(
                &store,
                &predicate,
                Some(&SortKey::Date("due_date".into())),
                order,
            );
            // Only POAM-1 has a due date; the undated two keep insertion order
            let ids: Vec<&str> = results.iter().map(|r| r.id()).collect();
            assert_eq!(ids, vec!["POAM-1", "POAM-3", "POAM-2"]);
        }
    }

    #[test]
    fn test_query_filters_and_does_not_mutate_store() {
        let store = store();
        let predicate = build(&FilterState::new().with_category("status", "open"));
        let results = query(&store, &predicate, None, SortOrder::Ascending);
        assert_eq!(results.len(), 2);
        assert_eq!(store.len(), 3);

        // Re-querying with another predicate works on the same store
        let predicate = build(&FilterState::new().with_category("status", "completed"));
        let results = query(&store, &predicate, None, SortOrder::Ascending);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id(), "POAM-1");
    }
}
