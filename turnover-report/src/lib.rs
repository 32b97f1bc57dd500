pub mod columns;
pub mod types;

pub use columns::{parse_report_date, ReportHeader};
pub use types::{ReportRow, TargetPeriod, TxnKind};
