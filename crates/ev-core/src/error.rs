use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the EV dashboard.
///
/// Dirty dataset rows never surface here; ingestion defaults or drops them
/// and records the fact in its report instead.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV header row could not be read.
    #[error("Failed to read CSV header: {0}")]
    CsvHeader(#[from] csv::Error),

    /// A field name did not match any record column.
    #[error("Unknown record field: {0}")]
    UnknownField(String),

    /// The dataset path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/some/registrations.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/registrations.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_unknown_field() {
        let err = DashboardError::UnknownField("colour".to_string());
        assert_eq!(err.to_string(), "Unknown record field: colour");
    }

    #[test]
    fn test_error_display_data_path_not_found() {
        let err = DashboardError::DataPathNotFound(PathBuf::from("/missing/data.csv"));
        assert_eq!(err.to_string(), "Data path not found: /missing/data.csv");
    }

    #[test]
    fn test_error_display_no_data_files() {
        let err = DashboardError::NoDataFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No CSV files found in /empty/dir");
    }

    #[test]
    fn test_error_from_csv_header() {
        let mut rdr = csv::ReaderBuilder::new().from_reader(&b"\xff\xfe,Make\n"[..]);
        let csv_err = rdr.headers().unwrap_err();
        let err: DashboardError = csv_err.into();
        assert!(err.to_string().starts_with("Failed to read CSV header"));
    }
}
