//! Reconciliation and turnover pipeline over seller-platform daily reports.
//!
//! Three stages, sequenced by [`run::run`]: extract report rows out of
//! downloaded zip bundles, filter them against the target period and
//! business predicates, then join the survivors with the stock snapshot to
//! derive a turnover ratio per product code. All stages are pure
//! transformations over in-memory tables; only the orchestrator writes
//! output files.

pub mod error;
pub mod extract;
pub mod filter;
pub mod run;
pub mod snapshot;
pub mod turnover;

mod cells;

pub use error::{PipelineError, Result};
pub use extract::{merge_reports, MergeReport, SkippedBundle};
pub use filter::filter_rows;
pub use run::{run, RunConfig, RunOutcome};
pub use snapshot::StockSnapshot;
pub use turnover::{calc_batch, calc_single, count_sales, SalesCounts, TurnoverRecord};
