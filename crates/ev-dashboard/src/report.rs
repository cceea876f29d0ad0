//! Non-interactive outputs: the plain-text summary and the JSON document.

use std::fmt::Write as _;

use ev_core::formatting::{format_count, format_miles, format_percent};
use ev_core::models::RecordField;
use ev_data::aggregator::{FieldCount, FleetAggregator, NO_DATA_LABEL};
use ev_data::analysis::DatasetAnalysis;
use ev_data::search;
use serde::Serialize;

/// Ranked counts for a `--group-by` field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBreakdown {
    pub field: RecordField,
    pub counts: Vec<FieldCount>,
}

impl GroupBreakdown {
    pub fn compute(analysis: &DatasetAnalysis, field: RecordField) -> Self {
        Self {
            field,
            counts: FleetAggregator::count_by_field_ranked(&analysis.records, field),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    #[serde(flatten)]
    analysis: &'a DatasetAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_by: Option<GroupBreakdown>,
}

/// Pretty-printed JSON for `--view json`.
pub fn render_json(
    analysis: &DatasetAnalysis,
    group_by: Option<RecordField>,
) -> serde_json::Result<String> {
    let report = JsonReport {
        analysis,
        group_by: group_by.map(|field| GroupBreakdown::compute(analysis, field)),
    };
    serde_json::to_string_pretty(&report)
}

/// Options for [`render_summary`].
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions<'a> {
    pub group_by: Option<RecordField>,
    pub search: Option<&'a str>,
    pub table_limit: usize,
}

fn push_counts(out: &mut String, title: &str, rows: impl IntoIterator<Item = (String, usize)>) {
    let rows: Vec<(String, usize)> = rows
        .into_iter()
        .map(|(name, count)| {
            let name = if name.is_empty() { "(blank)".to_string() } else { name };
            (name, count)
        })
        .collect();
    let _ = writeln!(out, "\n{title}");
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    let width = rows.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
    for (name, count) in rows {
        let _ = writeln!(out, "  {name:<width$}  {:>9}", format_count(count));
    }
}

/// Plain-text summary for `--view summary`.
pub fn render_summary(analysis: &DatasetAnalysis, options: &SummaryOptions<'_>) -> String {
    let summary = &analysis.summary;
    let m = &summary.metrics;
    let report = &analysis.report;
    let mut out = String::new();

    let _ = writeln!(out, "EV Population Summary ({})", analysis.metadata.data_path.display());
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "  Total vehicles:     {}", format_count(m.total_vehicles));
    let _ = writeln!(out, "  Average range:      {}", format_miles(m.average_range));
    let _ = writeln!(out, "  Top make:           {}", m.top_make);
    let _ = writeln!(
        out,
        "  Latest model year:  {}",
        m.latest_model_year
            .map_or_else(|| NO_DATA_LABEL.to_string(), |y| y.to_string())
    );
    let _ = writeln!(
        out,
        "  CAFV eligible:      {} ({})",
        format_count(m.eligible_count),
        format_percent(m.eligible_percent)
    );
    let _ = writeln!(out, "  Counties:           {}", format_count(m.unique_counties));

    push_counts(
        &mut out,
        "Top makes",
        summary.top_makes.iter().map(|c| (c.name.clone(), c.value)),
    );
    push_counts(
        &mut out,
        "Electric range (mi)",
        summary.range_distribution.iter().map(|b| (b.label.clone(), b.count)),
    );
    push_counts(
        &mut out,
        "Counties",
        summary.county_distribution.iter().map(|c| (c.name.clone(), c.value)),
    );
    push_counts(
        &mut out,
        "Model years",
        summary.year_trend.iter().map(|y| (y.year.to_string(), y.count)),
    );

    if let Some(field) = options.group_by {
        let breakdown = GroupBreakdown::compute(analysis, field);
        push_counts(
            &mut out,
            &format!("By {}", field.column_name()),
            breakdown.counts.into_iter().map(|c| (c.name, c.value)),
        );
    }

    if let Some(term) = options.search {
        let page = search::search(&analysis.records, term, options.table_limit);
        let _ = writeln!(out, "\nSearch \"{term}\": {}", page.caption());
        for record in &page.rows {
            let _ = writeln!(
                out,
                "  {:<10}  {:>4}  {:<12}  {:<16}  {:<5}  {}",
                record.vin,
                record.model_year,
                record.make,
                record.model,
                record.vehicle_type().short_label(),
                record.city
            );
        }
    }

    let _ = writeln!(
        out,
        "\nIngestion: {} rows read, {} dropped, {} numeric cells defaulted",
        format_count(report.rows_read),
        format_count(report.rows_dropped),
        format_count(report.total_numeric_defaults())
    );
    if !report.missing_columns.is_empty() {
        let _ = writeln!(out, "Missing columns: {}", report.missing_columns.join(", "));
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
