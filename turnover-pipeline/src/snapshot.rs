//! Stock snapshot loader.
//!
//! The stock-history workbook carries one wide sheet: a banner row, then
//! the real header, then one row per product code with one column per
//! reporting day plus descriptive columns (name, brand, size, ...). Only
//! the per-day quantities matter downstream, so totals are computed once
//! at load time.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use turnover_report::columns::{STOCK_DESCRIPTIVE, STOCK_NM_CODE};

use crate::cells::{cell_code, cell_number};
use crate::error::{PipelineError, Result};

/// Per-product stock totals summed across the snapshot's day columns.
#[derive(Debug, Clone, Default)]
pub struct StockSnapshot {
    totals: HashMap<i64, f64>,
}

impl StockSnapshot {
    /// Load the named sheet of a stock-history workbook.
    ///
    /// The first row is skipped (grouping banner); the second row is the
    /// header. For each product row the total is the sum of numeric cells
    /// in every non-descriptive column, so stray text columns introduced
    /// upstream contribute nothing. The first row wins when a code
    /// repeats. Missing sheet or key column is fatal.
    pub fn load(path: &Path, sheet: &str) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        if !workbook.sheet_names().iter().any(|name| name.as_str() == sheet) {
            return Err(PipelineError::MissingSheet(sheet.to_string()));
        }
        let range = workbook.worksheet_range(sheet)?;

        let mut rows = range.rows();
        rows.next();
        let Some(header_cells) = rows.next() else {
            return Err(PipelineError::MissingColumn(STOCK_NM_CODE));
        };
        let headers: Vec<String> = header_cells.iter().map(|c| c.to_string()).collect();

        let key_col = headers
            .iter()
            .position(|h| h.trim() == STOCK_NM_CODE)
            .ok_or(PipelineError::MissingColumn(STOCK_NM_CODE))?;
        let stock_cols: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !STOCK_DESCRIPTIVE.contains(&h.trim()))
            .map(|(i, _)| i)
            .collect();

        let mut totals = HashMap::new();
        for row in rows {
            let Some(code) = row.get(key_col).and_then(cell_code) else {
                continue;
            };
            let total: f64 = stock_cols
                .iter()
                .filter_map(|&i| row.get(i).and_then(cell_number))
                .sum();
            totals.entry(code).or_insert(total);
        }

        log::info!("Loaded stock snapshot: {} product codes", totals.len());
        Ok(Self { totals })
    }

    /// Build a snapshot from precomputed totals. Handy when the stock
    /// numbers come from somewhere other than the platform workbook.
    pub fn from_totals<I: IntoIterator<Item = (i64, f64)>>(totals: I) -> Self {
        Self {
            totals: totals.into_iter().collect(),
        }
    }

    /// Total stock for a product code; `None` when the code is absent
    /// from the snapshot.
    pub fn stock_total(&self, nm_code: i64) -> Option<f64> {
        self.totals.get(&nm_code).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
