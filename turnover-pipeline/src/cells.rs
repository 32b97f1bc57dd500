//! Cell coercions shared by the extractor and the snapshot loader.
//!
//! All of these are lossy on purpose: a cell that does not carry the
//! expected type coerces to `None` and the null-safe predicates downstream
//! take it from there.

use calamine::Data;
use chrono::NaiveDate;
use turnover_report::parse_report_date;

/// Non-empty text content of a cell.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// Product code: an integer, a float with no fractional part, or a numeric
/// string. Spreadsheets round-trip the code through all three.
pub(crate) fn cell_code(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strictly numeric cell value. Text, booleans and dates are not numbers
/// here; stray non-numeric columns must not leak into stock sums.
pub(crate) fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

/// Document date from either a native datetime cell or a text cell.
pub(crate) fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_report_date(s),
        _ => None,
    }
}
