use std::env;
use std::io::Write as _;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use turnover_pipeline::run::{run, RunConfig, RunOutcome};
use turnover_pipeline::{SkippedBundle, TurnoverRecord};
use turnover_report::columns::STOCK_SHEET;
use turnover_report::TargetPeriod;

/// CLI period arguments use the operational `DD-MM-YYYY` convention;
/// document dates inside the reports stay ISO.
const PERIOD_FORMAT: &str = "%d-%m-%Y";

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RunJson {
    generated_at: String,
    period: String,
    merged_rows: usize,
    filtered_rows: usize,
    skipped_bundles: Vec<SkippedBundle>,
    records: Vec<TurnoverRecord>,
    written: Vec<String>,
    run_ms: u128,
}

fn build_json(outcome: &RunOutcome, period: &TargetPeriod, run_ms: u128) -> RunJson {
    RunJson {
        generated_at: Utc::now().to_rfc3339(),
        period: period.to_string(),
        merged_rows: outcome.merged_rows,
        filtered_rows: outcome.filtered_rows,
        skipped_bundles: outcome.skipped.clone(),
        records: outcome.records.clone(),
        written: outcome
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        run_ms,
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn format_turnover(record: &TurnoverRecord) -> String {
    match record.turnover {
        Some(ratio) => format!("{:.2}", ratio),
        None => "undefined (sales == refunds)".to_string(),
    }
}

fn print_human(outcome: &RunOutcome, period: &TargetPeriod, single: bool, run_ms: u128) {
    println!();
    println!(
        "  Period {}  \u{00b7}  {} rows merged  \u{00b7}  {} bundles skipped  \u{00b7}  {} rows in period",
        period,
        outcome.merged_rows,
        outcome.skipped.len(),
        outcome.filtered_rows
    );

    for skipped in &outcome.skipped {
        println!("  ! skipped {}: {}", skipped.bundle, skipped.reason);
    }

    println!();
    if outcome.records.is_empty() {
        println!("  No turnover records produced.");
    } else if single {
        let record = &outcome.records[0];
        println!(
            "  nm {}  stocks {}  \u{00b7}  sales {}  \u{00b7}  refunds {}  \u{00b7}  turnover {}{}",
            record.nm_code,
            record.stocks,
            record.sales,
            record.refunds,
            format_turnover(record),
            if record.found { "" } else { "  (no stock data)" },
        );
    } else {
        let undefined = outcome.records.iter().filter(|r| r.turnover.is_none()).count();
        let unmatched = outcome.records.iter().filter(|r| !r.found).count();
        println!(
            "  {} product codes  \u{00b7}  {} without stock data  \u{00b7}  {} with undefined turnover",
            outcome.records.len(),
            unmatched,
            undefined
        );
    }

    println!();
    for path in &outcome.written {
        println!("  wrote {}", path.display());
    }
    println!("  Pipeline ran in {}ms", run_ms);
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!("Usage: turnover-cli <reports-dir> <stock.xlsx> --from DD-MM-YYYY --to DD-MM-YYYY [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --day DD-MM-YYYY   Single-day period instead of --from/--to");
    eprintln!("  --nm CODE          Compute turnover for one product code only");
    eprintln!("  --sheet NAME       Stock sheet name (default: {})", STOCK_SHEET);
    eprintln!("  --out-dir DIR      Output directory (default: data)");
    eprintln!("  --json             Output the run summary as JSON");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  turnover-cli data/downloads data/stock_history.xlsx --from 01-06-2025 --to 29-06-2025");
    eprintln!("  turnover-cli data/downloads data/stock_history.xlsx --day 15-06-2025 --nm 391624100 --json");
    process::exit(1);
}

fn parse_period_date(flag: &str, raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, PERIOD_FORMAT).unwrap_or_else(|_| {
        eprintln!("Error: {} expects a DD-MM-YYYY date, got '{}'", flag, raw);
        process::exit(1);
    })
}

fn flag_value<'a>(args: &'a [String], i: usize) -> &'a str {
    if i + 1 >= args.len() {
        eprintln!("Error: {} requires a value", args[i]);
        process::exit(1);
    }
    &args[i + 1]
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
    }

    let reports_dir = PathBuf::from(&args[1]);
    let stock_file = PathBuf::from(&args[2]);

    let mut from: Option<NaiveDate> = None;
    let mut to: Option<NaiveDate> = None;
    let mut day: Option<NaiveDate> = None;
    let mut target_nm: Option<i64> = None;
    let mut stock_sheet = STOCK_SHEET.to_string();
    let mut out_dir = PathBuf::from("data");
    let mut json_output = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--from" => {
                from = Some(parse_period_date("--from", flag_value(&args, i)));
                i += 2;
            }
            "--to" => {
                to = Some(parse_period_date("--to", flag_value(&args, i)));
                i += 2;
            }
            "--day" => {
                day = Some(parse_period_date("--day", flag_value(&args, i)));
                i += 2;
            }
            "--nm" => {
                target_nm = Some(flag_value(&args, i).parse().unwrap_or_else(|_| {
                    eprintln!("Error: --nm requires an integer product code");
                    process::exit(1);
                }));
                i += 2;
            }
            "--sheet" => {
                stock_sheet = flag_value(&args, i).to_string();
                i += 2;
            }
            "--out-dir" => {
                out_dir = PathBuf::from(flag_value(&args, i));
                i += 2;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
            }
        }
    }

    let period = match (day, from, to) {
        (Some(day), None, None) => TargetPeriod::Day(day),
        (None, Some(start), Some(end)) => {
            if end < start {
                eprintln!("Error: --to lies before --from");
                process::exit(1);
            }
            TargetPeriod::Range { start, end }
        }
        (Some(_), _, _) => {
            eprintln!("Error: --day cannot be combined with --from/--to");
            process::exit(1);
        }
        _ => {
            eprintln!("Error: provide either --from and --to, or --day");
            usage();
        }
    };

    let config = RunConfig::new(
        reports_dir,
        stock_file,
        stock_sheet,
        &out_dir,
        period,
        target_nm,
    );

    log::info!("Starting report process for period {}", period);
    let run_start = Instant::now();
    let outcome = match run(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Run failed: {}", e);
            process::exit(1);
        }
    };
    let run_ms = run_start.elapsed().as_millis();

    if json_output {
        let summary = build_json(&outcome, &period, run_ms);
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Failed to encode summary: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_human(&outcome, &period, target_nm.is_some(), run_ms);
    }
}
