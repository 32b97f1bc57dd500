//! Report filter.
//!
//! Keeps the rows of the unified table that belong to the target period,
//! are an actual sale or refund, and were not booked against a
//! supplier-owned warehouse.

use turnover_report::columns::SUPPLIER_WAREHOUSE_MARKER;
use turnover_report::{ReportRow, TargetPeriod};

/// Sale/refund under either transaction column. The upstream schema is
/// inconsistent: some report variants label the document type, others the
/// payment reason, so both are checked.
fn is_sale_or_refund(row: &ReportRow) -> bool {
    row.txn_kind().is_some()
}

/// Rows without a warehouse value pass; the marker match is a
/// case-sensitive substring test.
fn passes_warehouse(row: &ReportRow) -> bool {
    row.warehouse
        .as_deref()
        .map_or(true, |w| !w.contains(SUPPLIER_WAREHOUSE_MARKER))
}

/// Apply all predicates, producing the filtered table.
///
/// Unparseable document dates were coerced to `None` at extraction and
/// fall out through the period predicate. The operation is idempotent and
/// an empty result is not an error.
pub fn filter_rows(rows: &[ReportRow], period: &TargetPeriod) -> Vec<ReportRow> {
    rows.iter()
        .filter(|row| {
            period.contains(row.sale_date) && is_sale_or_refund(row) && passes_warehouse(row)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use turnover_report::columns::{TXN_REFUND, TXN_SALE};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn period() -> TargetPeriod {
        TargetPeriod::Range {
            start: d(1),
            end: d(29),
        }
    }

    fn sale(day: u32) -> ReportRow {
        ReportRow {
            source_bundle: "a.zip".into(),
            sale_date: Some(d(day)),
            doc_type: Some(TXN_SALE.into()),
            payment_reason: None,
            nm_code: Some(391624100),
            warehouse: Some("Коледино".into()),
        }
    }

    #[test]
    fn keeps_in_period_sales_and_refunds() {
        let mut refund = sale(20);
        refund.doc_type = None;
        refund.payment_reason = Some(TXN_REFUND.into());

        let rows = vec![sale(1), sale(29), refund];
        assert_eq!(filter_rows(&rows, &period()).len(), 3);
    }

    #[test]
    fn drops_out_of_period_rows() {
        let mut early = sale(15);
        early.sale_date = NaiveDate::from_ymd_opt(2025, 5, 31);
        let rows = vec![early];
        assert!(filter_rows(&rows, &period()).is_empty());
    }

    #[test]
    fn drops_rows_with_unparseable_dates() {
        let mut dateless = sale(15);
        dateless.sale_date = None;
        assert!(filter_rows(&[dateless], &period()).is_empty());
    }

    #[test]
    fn drops_other_transaction_kinds() {
        let mut storno = sale(15);
        storno.doc_type = Some("Сторно продаж".into());
        assert!(filter_rows(&[storno], &period()).is_empty());
    }

    #[test]
    fn accepts_label_under_either_column() {
        let by_doc_type = sale(10);

        let mut by_reason = sale(11);
        by_reason.doc_type = None;
        by_reason.payment_reason = Some(TXN_SALE.into());

        let kept = filter_rows(&[by_doc_type, by_reason], &period());
        assert_eq!(kept.len(), 2, "both column variants should pass, got {}", kept.len());
    }

    #[test]
    fn excludes_supplier_warehouses() {
        let mut supplier = sale(15);
        supplier.warehouse = Some("Склад поставщика - Казань".into());
        assert!(filter_rows(&[supplier], &period()).is_empty());
    }

    #[test]
    fn missing_warehouse_passes() {
        let mut no_wh = sale(15);
        no_wh.warehouse = None;
        assert_eq!(filter_rows(&[no_wh], &period()).len(), 1);
    }

    #[test]
    fn single_day_variant_matches_exact_date() {
        let day = TargetPeriod::Day(d(15));
        let rows = vec![sale(14), sale(15), sale(16)];
        let kept = filter_rows(&rows, &day);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sale_date, Some(d(15)));
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut supplier = sale(15);
        supplier.warehouse = Some("Склад поставщика".into());
        let rows = vec![sale(1), sale(29), supplier, sale(30)];

        let once = filter_rows(&rows, &period());
        let twice = filter_rows(&once, &period());
        assert_eq!(once, twice);
    }
}
