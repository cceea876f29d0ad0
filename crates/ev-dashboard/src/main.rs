mod bootstrap;
mod report;

use anyhow::{anyhow, Result};
use ev_core::settings::Settings;
use ev_data::analysis::analyze_dataset;
use ev_data::reader::IngestOptions;
use ev_ui::app::App;

use crate::report::SummaryOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("EV Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let data_path = settings
        .data
        .clone()
        .or_else(bootstrap::discover_data_path)
        .ok_or_else(|| {
            anyhow!(
                "No dataset found. Pass --data <PATH> or place {} in the current directory",
                bootstrap::DEFAULT_DATASET
            )
        })?;
    tracing::info!("Loading dataset from {}", data_path.display());

    let options = IngestOptions {
        delimiter: settings.delimiter,
    };
    let analysis =
        tokio::task::spawn_blocking(move || analyze_dataset(&data_path, options)).await??;

    let report = &analysis.report;
    if report.rows_dropped > 0 || report.total_numeric_defaults() > 0 {
        tracing::warn!(
            "Ingested {} of {} rows ({} dropped, {} numeric cells defaulted)",
            report.rows_kept(),
            report.rows_read,
            report.rows_dropped,
            report.total_numeric_defaults()
        );
    }

    let table_limit = settings.table_limit as usize;

    match settings.view.as_str() {
        "dashboard" => {
            let mut app = App::new(&settings.theme, analysis, table_limit);
            if let Some(term) = &settings.search {
                app = app.with_search(term.clone());
            }

            // The loop exits on 'q' / Ctrl+C inside the TUI. The OS-level
            // listener covers signals delivered outside raw mode.
            tokio::select! {
                result = app.run_dashboard() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        "summary" => {
            let options = SummaryOptions {
                group_by: settings.group_by,
                search: settings.search.as_deref(),
                table_limit,
            };
            print!("{}", report::render_summary(&analysis, &options));
        }

        "json" => {
            println!("{}", report::render_json(&analysis, settings.group_by)?);
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
