//! Dashboard analysis pipeline.
//!
//! Loads a dataset, folds it into every figure the dashboard shows, and
//! returns a [`DatasetAnalysis`] ready for the UI layer or JSON output.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ev_core::error::Result;
use ev_core::models::{RecordField, VehicleRecord};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{BucketCount, FieldCount, FleetAggregator, RangeBucket, YearCount};
use crate::reader::{load_records, IngestOptions, IngestReport};

/// Bars in the make chart.
pub const TOP_MAKES: usize = 6;
/// Named slices in the county chart before the rest is rolled up.
pub const TOP_COUNTIES: usize = 10;
pub const OTHERS_LABEL: &str = "Others";

// ── Public types ──────────────────────────────────────────────────────────────

/// Headline figures shown on the metric cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub total_vehicles: usize,
    pub average_range: f64,
    /// [`Self::average_range`] rounded to whole miles.
    pub average_range_miles: i64,
    pub top_make: String,
    pub latest_model_year: Option<i64>,
    pub eligible_count: usize,
    /// `None` when there are no records.
    pub eligible_percent: Option<f64>,
    pub unique_counties: usize,
}

/// Everything the dashboard renders, derived from one record slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub metrics: MetricSummary,
    pub top_makes: Vec<FieldCount>,
    pub range_distribution: Vec<BucketCount>,
    pub county_distribution: Vec<FieldCount>,
    pub year_trend: Vec<YearCount>,
}

/// Metadata produced alongside the summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub generated_at: DateTime<Utc>,
    /// Path the dataset was requested from.
    pub data_path: PathBuf,
    /// Files actually parsed.
    pub sources: Vec<PathBuf>,
    pub load_time_seconds: f64,
    pub summarize_time_seconds: f64,
}

/// The complete output of [`analyze_dataset`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAnalysis {
    /// Ingested records, kept for the table view.
    #[serde(skip)]
    pub records: Vec<VehicleRecord>,
    pub summary: DashboardSummary,
    pub report: IngestReport,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Compute every dashboard figure for `records`.
pub fn summarize(records: &[VehicleRecord]) -> DashboardSummary {
    let total = FleetAggregator::total_count(records);
    let average_range = FleetAggregator::average_range(records);
    let eligible_count = FleetAggregator::eligible_count(records);

    let metrics = MetricSummary {
        total_vehicles: total,
        average_range,
        average_range_miles: average_range.round() as i64,
        top_make: FleetAggregator::most_popular(records, RecordField::Make),
        latest_model_year: FleetAggregator::latest_model_year(records),
        eligible_count,
        eligible_percent: FleetAggregator::share(eligible_count, total),
        unique_counties: FleetAggregator::unique_values(records, RecordField::County).len(),
    };

    let mut top_makes = FleetAggregator::count_by_field_ranked(records, RecordField::Make);
    top_makes.truncate(TOP_MAKES);

    DashboardSummary {
        metrics,
        top_makes,
        range_distribution: FleetAggregator::range_histogram(
            records,
            &RangeBucket::default_buckets(),
        ),
        county_distribution: FleetAggregator::top_with_others(
            records,
            RecordField::County,
            TOP_COUNTIES,
            OTHERS_LABEL,
        ),
        year_trend: FleetAggregator::year_trend(records),
    }
}

/// Run the full pipeline.
///
/// 1. Load records from `data_path` (a file or a directory of CSV files).
/// 2. Summarize them with [`summarize`].
/// 3. Attach timings and the ingest report.
pub fn analyze_dataset(data_path: &Path, options: IngestOptions) -> Result<DatasetAnalysis> {
    let load_start = Instant::now();
    let loaded = load_records(data_path, options)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let summarize_start = Instant::now();
    let summary = summarize(&loaded.records);
    let summarize_time = summarize_start.elapsed().as_secs_f64();

    debug!(
        records = loaded.records.len(),
        load_time, summarize_time, "dataset analysis complete"
    );

    Ok(DatasetAnalysis {
        records: loaded.records,
        summary,
        report: loaded.report,
        metadata: AnalysisMetadata {
            generated_at: Utc::now(),
            data_path: data_path.to_path_buf(),
            sources: loaded.sources,
            load_time_seconds: load_time,
            summarize_time_seconds: summarize_time,
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::error::DashboardError;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "County,Model Year,Make,Clean Alternative Fuel Vehicle (CAFV) Eligibility,Electric Range";

    fn record(county: &str, make: &str, year: i64, range: i64, cafv: &str) -> VehicleRecord {
        VehicleRecord {
            county: county.to_string(),
            make: make.to_string(),
            model_year: year,
            electric_range: range,
            cafv_eligibility: cafv.to_string(),
            ..Default::default()
        }
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_scenario_a_metrics() {
        let records = vec![
            record("King", "TESLA", 2022, 300, "Clean Alternative Fuel Vehicle Eligible"),
            record("King", "TESLA", 2023, 0, "Eligibility unknown"),
            record("Pierce", "NISSAN", 2021, 150, "Not eligible due to low battery range"),
        ];
        let summary = summarize(&records);
        let m = &summary.metrics;
        assert_eq!(m.total_vehicles, 3);
        assert!((m.average_range - 225.0).abs() < 1e-9);
        assert_eq!(m.average_range_miles, 225);
        assert_eq!(m.top_make, "TESLA");
        assert_eq!(m.latest_model_year, Some(2023));
        assert_eq!(m.eligible_count, 1);
        assert_eq!(m.unique_counties, 2);
        assert!((m.eligible_percent.unwrap() - 100.0 / 3.0).abs() < 1e-9);

        assert_eq!(summary.top_makes[0], FieldCount::new("TESLA", 2));
        assert_eq!(summary.year_trend.len(), 3);
        assert_eq!(summary.range_distribution.len(), 7);
        assert_eq!(
            summary.range_distribution.iter().map(|b| b.count).sum::<usize>(),
            2
        );
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        let m = &summary.metrics;
        assert_eq!(m.total_vehicles, 0);
        assert_eq!(m.average_range, 0.0);
        assert_eq!(m.top_make, "N/A");
        assert_eq!(m.latest_model_year, None);
        assert_eq!(m.eligible_percent, None);
        assert!(summary.top_makes.is_empty());
        assert!(summary.county_distribution.is_empty());
        assert!(summary.range_distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_summarize_caps_makes_and_counties() {
        let mut records = Vec::new();
        for i in 0..12 {
            // County i appears i + 1 times; make i appears i + 1 times.
            for _ in 0..=i {
                records.push(record(&format!("C{i:02}"), &format!("M{i:02}"), 2020, 100, ""));
            }
        }
        let summary = summarize(&records);
        assert_eq!(summary.top_makes.len(), TOP_MAKES);
        assert_eq!(summary.top_makes[0].name, "M11");

        assert_eq!(summary.county_distribution.len(), TOP_COUNTIES + 1);
        let others = summary.county_distribution.last().unwrap();
        assert_eq!(others.name, OTHERS_LABEL);
        // C00 (1) + C01 (2) fall outside the top ten.
        assert_eq!(others.value, 3);
        let total: usize = summary.county_distribution.iter().map(|c| c.value).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = summarize(&[record("King", "KIA", 2021, 239, "")]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["metrics"]["totalVehicles"], 1);
        assert_eq!(json["metrics"]["topMake"], "KIA");
        assert_eq!(json["metrics"]["eligiblePercent"], 0.0);
        assert_eq!(json["yearTrend"][0]["year"], 2021);
    }

    // ── analyze_dataset ───────────────────────────────────────────────────────

    #[test]
    fn test_analyze_dataset_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ev.csv");
        fs::write(
            &path,
            format!(
                "{HEADER}\n\
                 King,2022,TESLA,Clean Alternative Fuel Vehicle Eligible,300\n\
                 King,2023,TESLA,Eligibility unknown,abc\n\
                 Pierce,2021,NISSAN,Not eligible due to low battery range,150\n"
            ),
        )
        .unwrap();

        let analysis = analyze_dataset(&path, IngestOptions::default()).unwrap();
        assert_eq!(analysis.records.len(), 3);
        assert_eq!(analysis.summary.metrics.average_range_miles, 225);
        assert_eq!(
            analysis.report.numeric_defaults.get(&RecordField::ElectricRange),
            Some(&1)
        );
        assert_eq!(analysis.metadata.sources, vec![path.clone()]);
        assert_eq!(analysis.metadata.data_path, path);
        assert!(analysis.metadata.load_time_seconds >= 0.0);
    }

    #[test]
    fn test_analyze_dataset_json_skips_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ev.csv");
        fs::write(&path, format!("{HEADER}\nKing,2022,TESLA,,300\n")).unwrap();

        let analysis = analyze_dataset(&path, IngestOptions::default()).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("records").is_none());
        assert_eq!(json["report"]["rowsRead"], 1);
        assert!(json["metadata"]["generatedAt"].is_string());
    }

    #[test]
    fn test_analyze_dataset_missing_path() {
        let tmp = TempDir::new().unwrap();
        let err = analyze_dataset(&tmp.path().join("nope.csv"), IngestOptions::default())
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataPathNotFound(_)));
    }
}
