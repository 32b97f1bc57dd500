//! Archive extractor.
//!
//! Each downloaded bundle is a zip holding one or more spreadsheet report
//! files. Extraction opens every bundle in a directory, parses the
//! spreadsheet entries, stamps each row with the bundle's file name, and
//! concatenates everything into one unified table. A malformed bundle is
//! skipped and recorded, never fatal to the run.

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Reader};
use serde::Serialize;
use turnover_report::{ReportHeader, ReportRow};

use crate::cells::{cell_code, cell_date, cell_text};
use crate::error::Result;

/// A bundle that failed to extract, with the cause. Collected into the
/// [`MergeReport`] so a run's per-bundle outcomes are inspectable as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBundle {
    pub bundle: String,
    pub reason: String,
}

/// The unified report table plus the bundles that did not make it in.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub rows: Vec<ReportRow>,
    pub skipped: Vec<SkippedBundle>,
}

fn is_spreadsheet(name: &str) -> bool {
    name.ends_with(".xlsx") || name.ends_with(".xls")
}

/// Parse one spreadsheet entry into report rows stamped with the bundle name.
///
/// Only the first worksheet is read; the platform exports single-sheet
/// files. The header row is resolved to column indices once, and missing
/// columns yield `None` cells for the whole sheet.
fn parse_sheet(bytes: &[u8], bundle: &str) -> Result<Vec<ReportRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let range = range?;

    let mut sheet_rows = range.rows();
    let Some(header_cells) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_cells.iter().map(|c| c.to_string()).collect();
    let header = ReportHeader::resolve(&headers);

    let mut rows = Vec::new();
    for row in sheet_rows {
        rows.push(ReportRow {
            source_bundle: bundle.to_string(),
            sale_date: header.sale_date.and_then(|i| row.get(i)).and_then(cell_date),
            doc_type: header.doc_type.and_then(|i| row.get(i)).and_then(cell_text),
            payment_reason: header
                .payment_reason
                .and_then(|i| row.get(i))
                .and_then(cell_text),
            nm_code: header.nm_code.and_then(|i| row.get(i)).and_then(cell_code),
            warehouse: header.warehouse.and_then(|i| row.get(i)).and_then(cell_text),
        });
    }
    Ok(rows)
}

/// Extract every spreadsheet entry of one bundle.
///
/// A bundle with zero spreadsheet entries contributes an empty vector.
/// The archive handle and each entry are scoped to this call and released
/// even when parsing fails partway.
pub fn extract_bundle(path: &Path) -> Result<Vec<ReportRow>> {
    let bundle = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut rows = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !is_spreadsheet(entry.name()) {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        rows.extend(parse_sheet(&bytes, &bundle)?);
    }
    Ok(rows)
}

/// Merge every `*.zip` bundle in a directory into one unified table.
///
/// Bundles are processed in sorted file-name order so runs are
/// deterministic regardless of directory listing order. A bundle that
/// fails to extract is logged and recorded in `skipped`; only a failure to
/// read the directory itself is fatal.
pub fn merge_reports(dir: &Path) -> Result<MergeReport> {
    let mut bundles: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().map_or(false, |ext| ext == "zip") && path.is_file()
        })
        .collect();
    bundles.sort();

    let mut report = MergeReport::default();
    for path in &bundles {
        let bundle = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("Merging bundle {}", bundle);
        match extract_bundle(path) {
            Ok(rows) => report.rows.extend(rows),
            Err(e) => {
                log::error!("Failed to process {}: {}", bundle, e);
                report.skipped.push(SkippedBundle {
                    bundle,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}
