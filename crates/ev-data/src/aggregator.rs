//! Summary statistics over an ingested record slice.
//!
//! Every function here is a read-only fold over `&[VehicleRecord]`; none keep
//! state between calls, so metrics can be computed in any order.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use ev_core::models::{Eligibility, RecordField, VehicleRecord};
use serde::Serialize;

/// Returned by [`FleetAggregator::most_popular`] when there is nothing to rank.
pub const NO_DATA_LABEL: &str = "N/A";

// ── Result types ──────────────────────────────────────────────────────────────

/// Number of records sharing one stringified field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCount {
    pub name: String,
    pub value: usize,
}

impl FieldCount {
    pub fn new(name: impl Into<String>, value: usize) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Records registered for one model year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i64,
    pub count: usize,
}

// ── RangeBucket ───────────────────────────────────────────────────────────────

/// Inclusive electric-range interval used by the histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeBucket {
    pub label: String,
    pub min: i64,
    /// `None` means no upper bound.
    pub max: Option<i64>,
}

impl RangeBucket {
    pub fn new(label: impl Into<String>, min: i64, max: Option<i64>) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, range: i64) -> bool {
        range >= self.min && self.max.map_or(true, |max| range <= max)
    }

    /// The dashboard's standard 50-mile buckets, open-ended above 300.
    pub fn default_buckets() -> Vec<RangeBucket> {
        vec![
            RangeBucket::new("0-50", 0, Some(50)),
            RangeBucket::new("51-100", 51, Some(100)),
            RangeBucket::new("101-150", 101, Some(150)),
            RangeBucket::new("151-200", 151, Some(200)),
            RangeBucket::new("201-250", 201, Some(250)),
            RangeBucket::new("251-300", 251, Some(300)),
            RangeBucket::new("300+", 301, None),
        ]
    }
}

/// Histogram output for one [`RangeBucket`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
}

// ── FleetAggregator ───────────────────────────────────────────────────────────

/// Stateless collection of aggregations over vehicle records.
pub struct FleetAggregator;

impl FleetAggregator {
    pub fn total_count(records: &[VehicleRecord]) -> usize {
        records.len()
    }

    /// Mean electric range over records that report one (`> 0`).
    ///
    /// Returns `0.0` when no record has a known range.
    pub fn average_range(records: &[VehicleRecord]) -> f64 {
        let (sum, n) = records
            .iter()
            .filter_map(VehicleRecord::known_range)
            .fold((0.0_f64, 0_usize), |(sum, n), range| (sum + range as f64, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Count records per distinct stringified value of `field`.
    ///
    /// Entries come back sorted by name; callers wanting a ranking should use
    /// [`Self::count_by_field_ranked`].
    pub fn count_by_field(records: &[VehicleRecord], field: RecordField) -> Vec<FieldCount> {
        let mut counts: BTreeMap<Cow<'_, str>, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.field_value(field)).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, value)| FieldCount::new(name.into_owned(), value))
            .collect()
    }

    /// [`Self::count_by_field`] ordered by count descending, then name ascending.
    pub fn count_by_field_ranked(records: &[VehicleRecord], field: RecordField) -> Vec<FieldCount> {
        let mut counts = Self::count_by_field(records, field);
        // Stable sort keeps the name order from the BTreeMap for equal counts.
        counts.sort_by(|a, b| b.value.cmp(&a.value));
        counts
    }

    /// Most frequent value of `field`.
    ///
    /// Ties go to the lexicographically smallest name. Returns
    /// [`NO_DATA_LABEL`] for empty input, and also when the winning value is
    /// the empty string.
    pub fn most_popular(records: &[VehicleRecord], field: RecordField) -> String {
        Self::count_by_field_ranked(records, field)
            .into_iter()
            .next()
            .map(|top| top.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| NO_DATA_LABEL.to_string())
    }

    /// Newest model year, or `None` for an empty slice.
    ///
    /// Records whose year defaulted to `0` still take part.
    pub fn latest_model_year(records: &[VehicleRecord]) -> Option<i64> {
        records.iter().map(|r| r.model_year).max()
    }

    /// Count records with a known range falling in each bucket.
    ///
    /// Records with `electric_range <= 0` are excluded from every bucket.
    pub fn range_histogram(records: &[VehicleRecord], buckets: &[RangeBucket]) -> Vec<BucketCount> {
        buckets
            .iter()
            .map(|bucket| BucketCount {
                label: bucket.label.clone(),
                count: records
                    .iter()
                    .filter_map(VehicleRecord::known_range)
                    .filter(|range| bucket.contains(*range))
                    .count(),
            })
            .collect()
    }

    pub fn unique_values(records: &[VehicleRecord], field: RecordField) -> BTreeSet<String> {
        records
            .iter()
            .map(|r| r.field_value(field).into_owned())
            .collect()
    }

    /// Top `k` ranked values of `field`, with the remainder rolled into one
    /// `others_label` entry when it is non-empty.
    pub fn top_with_others(
        records: &[VehicleRecord],
        field: RecordField,
        k: usize,
        others_label: &str,
    ) -> Vec<FieldCount> {
        let mut ranked = Self::count_by_field_ranked(records, field);
        let rest: usize = ranked.iter().skip(k).map(|c| c.value).sum();
        ranked.truncate(k);
        if rest > 0 {
            ranked.push(FieldCount::new(others_label, rest));
        }
        ranked
    }

    /// Registrations per model year, oldest first.
    pub fn year_trend(records: &[VehicleRecord]) -> Vec<YearCount> {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.model_year).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect()
    }

    /// Records whose CAFV column classifies as [`Eligibility::Eligible`].
    pub fn eligible_count(records: &[VehicleRecord]) -> usize {
        records
            .iter()
            .filter(|r| r.eligibility() == Eligibility::Eligible)
            .count()
    }

    /// `part / total` as a percentage, or `None` when `total` is zero.
    pub fn share(part: usize, total: usize) -> Option<f64> {
        (total > 0).then(|| part as f64 / total as f64 * 100.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
