//! Free-text filtering for the vehicle table.

use ev_core::models::{RecordField, VehicleRecord};

/// Rows shown in the vehicle table when no limit is configured.
pub const DEFAULT_TABLE_LIMIT: usize = 10;

/// Fields a search term is matched against.
pub const SEARCHABLE_FIELDS: [RecordField; 6] = [
    RecordField::Make,
    RecordField::Model,
    RecordField::City,
    RecordField::County,
    RecordField::ElectricVehicleType,
    RecordField::ModelYear,
];

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<'a> {
    /// Matching records in input order, at most `limit` of them.
    pub rows: Vec<&'a VehicleRecord>,
    /// Size of the whole filtered set.
    pub matched: usize,
}

impl SearchPage<'_> {
    /// "showing N of M" caption text.
    pub fn caption(&self) -> String {
        format!("showing {} of {} filtered records", self.rows.len(), self.matched)
    }
}

/// Case-insensitive substring match over [`SEARCHABLE_FIELDS`].
///
/// Surrounding whitespace in `term` is ignored; an empty term matches every
/// record.
pub fn matches(record: &VehicleRecord, term: &str) -> bool {
    matches_lowered(record, &normalise_term(term))
}

fn normalise_term(term: &str) -> String {
    term.trim().to_lowercase()
}

fn matches_lowered(record: &VehicleRecord, needle: &str) -> bool {
    needle.is_empty()
        || SEARCHABLE_FIELDS
            .iter()
            .any(|field| record.field_value(*field).to_lowercase().contains(needle))
}

/// Filter `records` by `term` and keep the first `limit` matches.
pub fn search<'a>(records: &'a [VehicleRecord], term: &str, limit: usize) -> SearchPage<'a> {
    let needle = normalise_term(term);
    let mut rows = Vec::with_capacity(limit.min(records.len()));
    let mut matched = 0;
    for record in records.iter().filter(|r| matches_lowered(r, &needle)) {
        if rows.len() < limit {
            rows.push(record);
        }
        matched += 1;
    }
    SearchPage { rows, matched }
}
