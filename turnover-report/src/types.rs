use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::columns::{TXN_REFUND, TXN_SALE};

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

/// One ledger entry from a daily report, mapped to the fixed schema at
/// ingestion time. Rows are never mutated after extraction, only filtered.
///
/// Every data field is optional: a report variant may omit whole columns,
/// and individual cells may be empty or unparseable. Downstream predicates
/// are null-safe, so `None` never needs special handling at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// File name of the bundle this row was extracted from.
    pub source_bundle: String,
    pub sale_date: Option<NaiveDate>,
    pub doc_type: Option<String>,
    pub payment_reason: Option<String>,
    pub nm_code: Option<i64>,
    pub warehouse: Option<String>,
}

impl ReportRow {
    /// Classify the row's transaction kind, checking the document type
    /// first and falling back to the payment reason. A row thus never
    /// classifies twice even when both columns are populated.
    pub fn txn_kind(&self) -> Option<TxnKind> {
        self.doc_type
            .as_deref()
            .and_then(TxnKind::from_label)
            .or_else(|| self.payment_reason.as_deref().and_then(TxnKind::from_label))
    }
}

// ---------------------------------------------------------------------------
// Transaction kinds
// ---------------------------------------------------------------------------

/// The two transaction kinds the pipeline cares about. Any other label is
/// neither a sale nor a refund and is excluded from all counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxnKind {
    Sale,
    Refund,
}

impl TxnKind {
    /// Exact-match classification against the two known labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            TXN_SALE => Some(TxnKind::Sale),
            TXN_REFUND => Some(TxnKind::Refund),
            _ => None,
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnKind::Sale => write!(f, "{}", TXN_SALE),
            TxnKind::Refund => write!(f, "{}", TXN_REFUND),
        }
    }
}

// ---------------------------------------------------------------------------
// Target periods
// ---------------------------------------------------------------------------

/// The reporting window a run filters against: an inclusive date range or
/// a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetPeriod {
    Range { start: NaiveDate, end: NaiveDate },
    Day(NaiveDate),
}

impl TargetPeriod {
    /// Whether a document date falls inside the period. `None` dates
    /// (missing or unparseable) are never contained.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return false;
        };
        match self {
            TargetPeriod::Range { start, end } => *start <= date && date <= *end,
            TargetPeriod::Day(day) => date == *day,
        }
    }
}

impl fmt::Display for TargetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPeriod::Range { start, end } => write!(f, "{}..{}", start, end),
            TargetPeriod::Day(day) => write!(f, "{}", day),
        }
    }
}
