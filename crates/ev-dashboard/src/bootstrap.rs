use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use ev_data::reader::find_csv_files;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Dataset file name looked for when `--data` is not given.
pub const DEFAULT_DATASET: &str = "Electric_Vehicle_Population_Data.csv";

const APP_DIR: &str = ".ev-dashboard";

fn home_or_cwd() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.ev-dashboard/` and its `data/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&home_or_cwd())
}

pub fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = home.join(APP_DIR);
    for dir in [app_dir.clone(), app_dir.join("data")] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a user-facing level name onto an `EnvFilter` directive.
///
/// `RUST_LOG`-style directives (e.g. `ev_data=debug`) pass through unchanged.
fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARN" | "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` when given, so the full-screen dashboard is not
/// overwritten by log lines, and to stderr otherwise.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true);
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the dataset when `--data` was not given.
///
/// Checks, in order, and returns the first match:
/// 1. `./Electric_Vehicle_Population_Data.csv`
/// 2. `./data/Electric_Vehicle_Population_Data.csv`
/// 3. `~/.ev-dashboard/data/`, only when it holds at least one CSV file
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_data_path_in(&cwd, &home_or_cwd())
}

pub fn discover_data_path_in(cwd: &Path, home: &Path) -> Option<PathBuf> {
    let files = [cwd.join(DEFAULT_DATASET), cwd.join("data").join(DEFAULT_DATASET)];
    if let Some(file) = files.into_iter().find(|p| p.is_file()) {
        return Some(file);
    }

    let data_dir = home.join(APP_DIR).join("data");
    if data_dir.is_dir() && !find_csv_files(&data_dir).is_empty() {
        return Some(data_dir);
    }
    None
}

// ── Tests ──────────────────────────────────────────────────────────────────────
