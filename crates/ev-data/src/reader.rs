//! CSV discovery and loading for the EV dashboard.
//!
//! Turns raw registration CSV text into [`VehicleRecord`]s. Ingestion is
//! lenient: undecodable or blank rows are dropped and unparseable numbers
//! default to `0`, with every such event counted in an [`IngestReport`].

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use ev_core::data_processors::{Coerced, FieldParser};
use ev_core::error::{DashboardError, Result};
use ev_core::models::{RecordField, VehicleRecord};
use serde::Serialize;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

// ── Options / report ──────────────────────────────────────────────────────────

/// Knobs for the CSV reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Column separator byte.
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Data-quality counters collected while ingesting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Data rows seen, header excluded, dropped rows included.
    pub rows_read: usize,
    /// Rows that could not be decoded or had no non-empty cell.
    pub rows_dropped: usize,
    /// Per numeric field, cells that were empty or unparseable and became `0`.
    /// Only columns present in the header are counted.
    pub numeric_defaults: BTreeMap<RecordField, usize>,
    /// Mapped column names absent from the header. Every record holds the
    /// default value for these.
    pub missing_columns: Vec<String>,
}

impl IngestReport {
    /// Records that made it into the output.
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_dropped
    }

    /// Sum of [`Self::numeric_defaults`] across fields.
    pub fn total_numeric_defaults(&self) -> usize {
        self.numeric_defaults.values().sum()
    }

    /// Fold another file's report into this one.
    pub fn merge(&mut self, other: IngestReport) {
        self.rows_read += other.rows_read;
        self.rows_dropped += other.rows_dropped;
        for (field, n) in other.numeric_defaults {
            *self.numeric_defaults.entry(field).or_default() += n;
        }
        for column in other.missing_columns {
            if !self.missing_columns.contains(&column) {
                self.missing_columns.push(column);
            }
        }
    }
}

/// Records loaded from one file or a directory of files.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub records: Vec<VehicleRecord>,
    pub report: IngestReport,
    /// Files that were parsed, in load order.
    pub sources: Vec<PathBuf>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse CSV text held in memory with default options.
pub fn parse_str(text: &str) -> Result<(Vec<VehicleRecord>, IngestReport)> {
    parse_records(text.as_bytes(), IngestOptions::default())
}

/// Parse CSV from any reader. The first row is the header.
///
/// Fails only when the header row itself cannot be read. Output order
/// follows input row order.
pub fn parse_records<R: Read>(
    reader: R,
    options: IngestOptions,
) -> Result<(Vec<VehicleRecord>, IngestReport)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);

    let mut report = IngestReport {
        missing_columns: columns.missing(),
        ..Default::default()
    };
    if !report.missing_columns.is_empty() {
        warn!(
            "CSV header is missing {} expected column(s): {}",
            report.missing_columns.len(),
            report.missing_columns.join(", ")
        );
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        report.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!("Dropping undecodable CSV row {}: {}", report.rows_read, e);
                report.rows_dropped += 1;
                continue;
            }
        };
        if row.iter().all(str::is_empty) {
            report.rows_dropped += 1;
            continue;
        }
        records.push(columns.build(&row, &mut report));
    }

    debug!(
        "{} rows read, {} dropped, {} numeric cells defaulted",
        report.rows_read,
        report.rows_dropped,
        report.total_numeric_defaults()
    );

    Ok((records, report))
}

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load a single CSV file, or every CSV file under a directory.
///
/// For a directory, files are read in sorted path order and their records
/// concatenated; a file that cannot be opened or whose header is unreadable
/// is logged and skipped.
pub fn load_records(path: &Path, options: IngestOptions) -> Result<LoadedDataset> {
    if !path.exists() {
        return Err(DashboardError::DataPathNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        let (records, report) = load_file(path, options)?;
        return Ok(LoadedDataset {
            records,
            report,
            sources: vec![path.to_path_buf()],
        });
    }

    let files = find_csv_files(path);
    if files.is_empty() {
        return Err(DashboardError::NoDataFiles(path.to_path_buf()));
    }

    let mut dataset = LoadedDataset::default();
    for file in files {
        match load_file(&file, options) {
            Ok((records, report)) => {
                dataset.records.extend(records);
                dataset.report.merge(report);
                dataset.sources.push(file);
            }
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }

    debug!(
        "Loaded {} records from {} files",
        dataset.records.len(),
        dataset.sources.len()
    );
    Ok(dataset)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn load_file(path: &Path, options: IngestOptions) -> Result<(Vec<VehicleRecord>, IngestReport)> {
    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(std::io::BufReader::new(file), options)
}

/// Header position of every [`RecordField`], resolved once per file.
struct ColumnMap {
    positions: [Option<usize>; RecordField::ALL.len()],
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let names: Vec<&str> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h })
            .collect();

        let mut positions = [None; RecordField::ALL.len()];
        for (slot, field) in positions.iter_mut().zip(RecordField::ALL) {
            *slot = names.iter().position(|name| *name == field.column_name());
        }
        Self { positions }
    }

    fn position(&self, field: RecordField) -> Option<usize> {
        // ALL is declared in variant order, so the discriminant indexes it.
        self.positions[field as usize]
    }

    fn missing(&self) -> Vec<String> {
        RecordField::ALL
            .into_iter()
            .filter(|field| self.position(*field).is_none())
            .map(|field| field.column_name().to_string())
            .collect()
    }

    fn cell<'r>(&self, row: &'r csv::StringRecord, field: RecordField) -> Option<&'r str> {
        self.position(field).and_then(|i| row.get(i))
    }

    fn text(&self, row: &csv::StringRecord, field: RecordField) -> String {
        FieldParser::text(self.cell(row, field))
    }

    fn integer(&self, row: &csv::StringRecord, field: RecordField, report: &mut IngestReport) -> i64 {
        let coerced = FieldParser::integer(self.cell(row, field));
        if let Coerced::Defaulted(_) = coerced {
            if self.position(field).is_some() {
                *report.numeric_defaults.entry(field).or_default() += 1;
            }
        }
        coerced.into_value()
    }

    fn build(&self, row: &csv::StringRecord, report: &mut IngestReport) -> VehicleRecord {
        VehicleRecord {
            vin: self.text(row, RecordField::Vin),
            county: self.text(row, RecordField::County),
            city: self.text(row, RecordField::City),
            state: self.text(row, RecordField::State),
            postal_code: self.text(row, RecordField::PostalCode),
            model_year: self.integer(row, RecordField::ModelYear, report),
            make: self.text(row, RecordField::Make),
            model: self.text(row, RecordField::Model),
            electric_vehicle_type: self.text(row, RecordField::ElectricVehicleType),
            cafv_eligibility: self.text(row, RecordField::CafvEligibility),
            electric_range: self.integer(row, RecordField::ElectricRange, report),
            base_msrp: self.integer(row, RecordField::BaseMsrp, report),
            legislative_district: self.text(row, RecordField::LegislativeDistrict),
            dol_vehicle_id: self.text(row, RecordField::DolVehicleId),
            vehicle_location: self.text(row, RecordField::VehicleLocation),
            electric_utility: self.text(row, RecordField::ElectricUtility),
            census_tract: self.text(row, RecordField::CensusTract),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
