//! Column schema of the seller-platform reports.
//!
//! Every locale-specific literal the pipeline touches lives here: the report
//! column headers, the two transaction labels, the supplier-warehouse marker,
//! and the stock-snapshot layout. The upstream platform emits these names
//! verbatim; they must match literally.

use chrono::NaiveDate;

/// Document date of the ledger entry.
pub const SALE_DATE: &str = "Дата продажи";
/// Document type; carries the transaction label in some report variants.
pub const DOC_TYPE: &str = "Тип документа";
/// Payment reason; carries the transaction label in the other variants.
pub const PAYMENT_REASON: &str = "Обоснование для оплаты";
/// Nomenclature code — the product key joining reports to stock rows.
pub const NM_CODE: &str = "Код номенклатуры";
/// Warehouse the movement was booked against.
pub const WAREHOUSE: &str = "Склад";

/// Transaction label for a sale.
pub const TXN_SALE: &str = "Продажа";
/// Transaction label for a refund.
pub const TXN_REFUND: &str = "Возврат";

/// Substring marking supplier-owned warehouses. Rows whose warehouse
/// contains it are supplier-held inventory movements, not platform sales,
/// and are excluded by the filter. Case-sensitive.
pub const SUPPLIER_WAREHOUSE_MARKER: &str = "Склад поставщика";

/// Sheet of the stock-history workbook holding per-day quantities.
pub const STOCK_SHEET: &str = "Остатки по дням";
/// Product-code column of the stock sheet.
pub const STOCK_NM_CODE: &str = "Артикул WB";
/// Descriptive stock-sheet columns excluded from the quantity sum.
pub const STOCK_DESCRIPTIVE: [&str; 6] = [
    "Артикул продавца",
    "Название",
    "Артикул WB",
    "Предмет",
    "Бренд",
    "Размер",
];

/// Parse a document date as the platform writes it.
///
/// Reports carry `%Y-%m-%d`, occasionally with a time-of-day suffix.
/// Anything else coerces to `None`: malformed dates are a data-quality
/// condition, not an error, and rows carrying them fall out of every
/// period predicate.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Column indices of one report sheet, resolved once from its header row.
///
/// Every field is optional: the upstream schema is inconsistent between
/// report variants (some carry the document type, some the payment reason),
/// and a missing column simply yields `None` cells for that sheet's rows.
#[derive(Debug, Clone, Default)]
pub struct ReportHeader {
    pub sale_date: Option<usize>,
    pub doc_type: Option<usize>,
    pub payment_reason: Option<usize>,
    pub nm_code: Option<usize>,
    pub warehouse: Option<usize>,
}

impl ReportHeader {
    /// Resolve header names to column indices. Exact, case-sensitive match.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name)
        };
        Self {
            sale_date: find(SALE_DATE),
            doc_type: find(DOC_TYPE),
            payment_reason: find(PAYMENT_REASON),
            nm_code: find(NM_CODE),
            warehouse: find(WAREHOUSE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_report_date("2025-06-15"),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
        assert_eq!(
            parse_report_date(" 2025-06-01 "),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn parses_datetime_suffixes() {
        assert_eq!(
            parse_report_date("2025-06-15 13:45:00"),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
        assert_eq!(
            parse_report_date("2025-06-15T00:00:00"),
            NaiveDate::from_ymd_opt(2025, 6, 15)
        );
    }

    #[test]
    fn malformed_dates_coerce_to_none() {
        assert_eq!(parse_report_date("15-06-2025"), None);
        assert_eq!(parse_report_date("yesterday"), None);
        assert_eq!(parse_report_date(""), None);
        assert_eq!(parse_report_date("2025-13-40"), None);
    }

    #[test]
    fn resolves_headers_in_any_order() {
        let headers = vec![
            WAREHOUSE.to_string(),
            "Лишняя колонка".to_string(),
            NM_CODE.to_string(),
            SALE_DATE.to_string(),
        ];
        let header = ReportHeader::resolve(&headers);
        assert_eq!(header.warehouse, Some(0));
        assert_eq!(header.nm_code, Some(2));
        assert_eq!(header.sale_date, Some(3));
        assert_eq!(header.doc_type, None);
        assert_eq!(header.payment_reason, None);
    }
}
