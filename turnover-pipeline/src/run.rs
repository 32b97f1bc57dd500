//! Run orchestrator.
//!
//! Sequences the three stages (extract, filter, calculate), persisting
//! each table as it is produced. This is the only module that writes to
//! the output filesystem; everything upstream is a pure transformation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use turnover_report::{ReportRow, TargetPeriod};

use crate::error::Result;
use crate::extract::{merge_reports, SkippedBundle};
use crate::filter::filter_rows;
use crate::snapshot::StockSnapshot;
use crate::turnover::{calc_batch, calc_single, TurnoverRecord};

/// Merged-table output file name.
pub const MERGED_FILE: &str = "daily_reports_merged.csv";
/// Filtered-table output file name.
pub const FILTERED_FILE: &str = "daily_reports_filtered.csv";
/// Turnover-result output file name.
pub const TURNOVER_FILE: &str = "turnover.csv";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Static parameters of one run. Built in one place so defaults are never
/// duplicated across entry points.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory of downloaded report bundles.
    pub reports_dir: PathBuf,
    /// Stock-history workbook.
    pub stock_file: PathBuf,
    /// Sheet of the workbook holding per-day stock quantities.
    pub stock_sheet: String,
    pub merged_out: PathBuf,
    pub filtered_out: PathBuf,
    pub turnover_out: PathBuf,
    pub period: TargetPeriod,
    /// When set, compute turnover for this code only; otherwise one
    /// record per code found in the filtered table.
    pub target_nm: Option<i64>,
}

impl RunConfig {
    /// Standard configuration with the three outputs under `out_dir`.
    pub fn new(
        reports_dir: impl Into<PathBuf>,
        stock_file: impl Into<PathBuf>,
        stock_sheet: impl Into<String>,
        out_dir: &Path,
        period: TargetPeriod,
        target_nm: Option<i64>,
    ) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            stock_file: stock_file.into(),
            stock_sheet: stock_sheet.into(),
            merged_out: out_dir.join(MERGED_FILE),
            filtered_out: out_dir.join(FILTERED_FILE),
            turnover_out: out_dir.join(TURNOVER_FILE),
            period,
            target_nm,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What a run did, as data: table sizes, per-bundle skips, the computed
/// records, and which output files were actually written.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub merged_rows: usize,
    pub filtered_rows: usize,
    pub skipped: Vec<SkippedBundle>,
    pub records: Vec<TurnoverRecord>,
    pub written: Vec<PathBuf>,
}

/// Persist a table as CSV, overwriting any previous output.
fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Execute the full pipeline.
///
/// Persistence of an empty table is skipped with a notice rather than
/// writing a meaningless file; the run itself still completes and later
/// stages consume the empty table unchanged.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    let mut outcome = RunOutcome::default();

    let merged = merge_reports(&config.reports_dir)?;
    outcome.merged_rows = merged.rows.len();
    outcome.skipped = merged.skipped;
    if merged.rows.is_empty() {
        log::info!("Merged data is empty!");
    } else {
        write_table(&config.merged_out, &merged.rows)?;
        outcome.written.push(config.merged_out.clone());
    }

    let filtered: Vec<ReportRow> = filter_rows(&merged.rows, &config.period);
    outcome.filtered_rows = filtered.len();
    if filtered.is_empty() {
        log::info!("Filtered data is empty!");
    } else {
        write_table(&config.filtered_out, &filtered)?;
        outcome.written.push(config.filtered_out.clone());
    }

    let snapshot = StockSnapshot::load(&config.stock_file, &config.stock_sheet)?;
    outcome.records = match config.target_nm {
        Some(nm_code) => vec![calc_single(&snapshot, &filtered, nm_code)],
        None => calc_batch(&snapshot, &filtered),
    };
    if outcome.records.is_empty() {
        log::info!("Turnover result is empty!");
    } else {
        write_table(&config.turnover_out, &outcome.records)?;
        outcome.written.push(config.turnover_out.clone());
    }

    Ok(outcome)
}
