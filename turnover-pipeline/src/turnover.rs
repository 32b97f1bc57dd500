//! Turnover calculator.
//!
//! Joins the filtered report table against the stock snapshot by product
//! code and derives the turnover ratio: stock total over net units sold
//! (sales minus refunds). When sales equal refunds the ratio is
//! undefined and represented explicitly, never as infinity or a crash.

use std::collections::HashSet;

use serde::Serialize;
use turnover_report::{ReportRow, TxnKind};

use crate::snapshot::StockSnapshot;

// ---------------------------------------------------------------------------
// Sales counts
// ---------------------------------------------------------------------------

/// Sale and refund tallies for one product code. Absent categories are
/// zero, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesCounts {
    pub sales: u64,
    pub refunds: u64,
}

impl SalesCounts {
    /// Net units sold. Negative when refunds outnumber sales.
    pub fn net(&self) -> i64 {
        self.sales as i64 - self.refunds as i64
    }
}

/// Tally the filtered rows of one product code by transaction kind.
/// Rows whose kind is neither sale nor refund count toward neither.
pub fn count_sales(rows: &[ReportRow], nm_code: i64) -> SalesCounts {
    let mut counts = SalesCounts::default();
    for row in rows.iter().filter(|r| r.nm_code == Some(nm_code)) {
        match row.txn_kind() {
            Some(TxnKind::Sale) => counts.sales += 1,
            Some(TxnKind::Refund) => counts.refunds += 1,
            None => {}
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Turnover records
// ---------------------------------------------------------------------------

/// Per-product turnover result.
///
/// `found` says whether the code appeared in the stock snapshot (absent
/// codes keep `stocks = 0`). `turnover` is `None` when sales equal
/// refunds: the ratio is undefined, and that absence is itself signal,
/// so such codes are kept in the output rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverRecord {
    pub nm_code: i64,
    pub found: bool,
    pub stocks: f64,
    pub sales: u64,
    pub refunds: u64,
    pub turnover: Option<f64>,
}

fn build_record(snapshot: &StockSnapshot, rows: &[ReportRow], nm_code: i64) -> TurnoverRecord {
    let stocks_found = snapshot.stock_total(nm_code);
    let stocks = stocks_found.unwrap_or(0.0);
    let counts = count_sales(rows, nm_code);
    let turnover = match counts.net() {
        0 => None,
        net => Some(stocks / net as f64),
    };
    TurnoverRecord {
        nm_code,
        found: stocks_found.is_some(),
        stocks,
        sales: counts.sales,
        refunds: counts.refunds,
        turnover,
    }
}

/// Single-code mode: one record for the requested code, with info-level
/// progress matching the batch record's fields.
pub fn calc_single(snapshot: &StockSnapshot, rows: &[ReportRow], nm_code: i64) -> TurnoverRecord {
    let record = build_record(snapshot, rows, nm_code);
    if record.found {
        log::info!("Total stocks for nm = {}: {}", nm_code, record.stocks);
    } else {
        log::info!("No stock data for nm = {}", nm_code);
    }
    log::info!(
        "Total sales, refunds for nm = {}: {}, {}",
        nm_code,
        record.sales,
        record.refunds
    );
    match record.turnover {
        Some(ratio) => log::info!("Turnover for nm = {}: {}", nm_code, ratio),
        None => log::info!(
            "Turnover for nm = {} is undefined (sales == refunds)",
            nm_code
        ),
    }
    record
}

/// Batch mode: one record per distinct non-null product code in the
/// filtered table, in the order codes are first seen. Codes missing from
/// the snapshot or with an undefined ratio stay in the output.
pub fn calc_batch(snapshot: &StockSnapshot, rows: &[ReportRow]) -> Vec<TurnoverRecord> {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();
    for row in rows {
        if let Some(code) = row.nm_code {
            if seen.insert(code) {
                codes.push(code);
            }
        }
    }

    codes
        .into_iter()
        .map(|code| {
            let record = build_record(snapshot, rows, code);
            log::debug!(
                "nm = {}: stocks {}, sales {}, refunds {}, turnover {:?}",
                code,
                record.stocks,
                record.sales,
                record.refunds,
                record.turnover
            );
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use turnover_report::columns::{TXN_REFUND, TXN_SALE};

    const NM: i64 = 391624100;

    fn txn_row(nm_code: i64, label: &str) -> ReportRow {
        ReportRow {
            source_bundle: "a.zip".into(),
            sale_date: NaiveDate::from_ymd_opt(2025, 6, 15),
            doc_type: Some(label.into()),
            payment_reason: None,
            nm_code: Some(nm_code),
            warehouse: None,
        }
    }

    fn rows(nm_code: i64, sales: usize, refunds: usize) -> Vec<ReportRow> {
        let mut rows = Vec::new();
        rows.extend((0..sales).map(|_| txn_row(nm_code, TXN_SALE)));
        rows.extend((0..refunds).map(|_| txn_row(nm_code, TXN_REFUND)));
        rows
    }

    #[test]
    fn counts_default_to_zero() {
        let counts = count_sales(&[], NM);
        assert_eq!(counts, SalesCounts::default());
        assert_eq!(counts.net(), 0);
    }

    #[test]
    fn counts_ignore_other_codes_and_kinds() {
        let mut data = rows(NM, 2, 1);
        data.extend(rows(111, 5, 0));
        data.push(txn_row(NM, "Логистика"));

        let counts = count_sales(&data, NM);
        assert_eq!(counts.sales, 2);
        assert_eq!(counts.refunds, 1);
    }

    #[test]
    fn turnover_is_stock_over_net_sales() {
        let snapshot = StockSnapshot::from_totals([(NM, 30.0)]);
        let record = calc_single(&snapshot, &rows(NM, 5, 2), NM);
        assert!(record.found);
        assert_eq!(record.stocks, 30.0);
        assert_eq!(record.sales, 5);
        assert_eq!(record.refunds, 2);
        assert_eq!(record.turnover, Some(10.0));
    }

    #[test]
    fn equal_sales_and_refunds_leave_turnover_undefined() {
        let snapshot = StockSnapshot::from_totals([(NM, 30.0)]);
        let record = calc_single(&snapshot, &rows(NM, 5, 5), NM);
        assert!(record.found);
        assert_eq!(record.stocks, 30.0);
        assert_eq!(record.sales, 5);
        assert_eq!(record.refunds, 5);
        assert_eq!(record.turnover, None);
    }

    #[test]
    fn missing_snapshot_code_yields_zero_stock_not_found() {
        let snapshot = StockSnapshot::default();
        let record = calc_single(&snapshot, &rows(NM, 3, 1), NM);
        assert!(!record.found);
        assert_eq!(record.stocks, 0.0);
        assert_eq!(record.turnover, Some(0.0));
    }

    #[test]
    fn net_refunds_produce_negative_turnover() {
        let snapshot = StockSnapshot::from_totals([(NM, 30.0)]);
        let record = calc_single(&snapshot, &rows(NM, 1, 4), NM);
        assert_eq!(record.turnover, Some(-10.0));
    }

    #[test]
    fn batch_keeps_first_discovery_order() {
        let snapshot = StockSnapshot::from_totals([(2, 10.0), (3, 20.0)]);
        let mut data = rows(3, 1, 0);
        data.extend(rows(1, 1, 0));
        data.extend(rows(3, 1, 0));
        data.extend(rows(2, 1, 0));

        let records = calc_batch(&snapshot, &data);
        let order: Vec<i64> = records.iter().map(|r| r.nm_code).collect();
        assert_eq!(order, vec![3, 1, 2], "expected first-discovery order, got {:?}", order);
    }

    #[test]
    fn batch_skips_rows_without_codes() {
        let snapshot = StockSnapshot::default();
        let mut codeless = txn_row(NM, TXN_SALE);
        codeless.nm_code = None;
        assert!(calc_batch(&snapshot, &[codeless]).is_empty());
    }

    #[test]
    fn batch_keeps_unmatched_and_undefined_codes() {
        let snapshot = StockSnapshot::from_totals([(1, 30.0)]);
        let mut data = rows(1, 5, 5);
        data.extend(rows(2, 2, 0));

        let records = calc_batch(&snapshot, &data);
        assert_eq!(records.len(), 2);

        assert!(records[0].found);
        assert_eq!(records[0].turnover, None);

        assert!(!records[1].found);
        assert_eq!(records[1].stocks, 0.0);
        assert_eq!(records[1].turnover, Some(0.0));
    }
}
