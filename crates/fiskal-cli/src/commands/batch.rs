//! Batch command - parse every journal matching a glob pattern.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use fiskal_core::{JournalParser, Receipt};

use super::load_config;
use super::output::{format_receipts, OutputFormat};
use super::parse::{journal_parser, parse_file};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching journal files
    #[arg(required = true)]
    pattern: String,

    /// Directory for per-file output and the summary
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write summary.csv
    #[arg(long)]
    summary: bool,

    /// Number of journals parsed at once
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Keep going when a journal fails to parse
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of parsing one journal file.
struct FileOutcome {
    path: PathBuf,
    result: Result<Receipt, String>,
    elapsed: Duration,
}

impl FileOutcome {
    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

/// One line of summary.csv.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'static str,
    number: &'a str,
    counter: &'a str,
    receipt_type: &'static str,
    date: String,
    company_name: &'a str,
    total_purchase: String,
    total_refund: String,
    total_tax: String,
    item_count: usize,
    processing_time_ms: u64,
    error: &'a str,
}

impl<'a> SummaryRow<'a> {
    fn new(outcome: &'a FileOutcome) -> Self {
        let processing_time_ms = outcome.elapsed.as_millis() as u64;

        match &outcome.result {
            Ok(receipt) => Self {
                filename: outcome.file_name(),
                status: "success",
                number: &receipt.number,
                counter: &receipt.counter,
                receipt_type: receipt.receipt_type.label(),
                date: receipt.date.to_rfc3339(),
                company_name: &receipt.store.company_name,
                total_purchase: receipt.total_purchase_amount.as_decimal().to_string(),
                total_refund: receipt.total_refund_amount.as_decimal().to_string(),
                total_tax: receipt.total_tax_amount.as_decimal().to_string(),
                item_count: receipt.items.len(),
                processing_time_ms,
                error: "",
            },
            Err(message) => Self {
                filename: outcome.file_name(),
                status: "error",
                number: "",
                counter: "",
                receipt_type: "",
                date: String::new(),
                company_name: "",
                total_purchase: String::new(),
                total_refund: String::new(),
                total_tax: String::new(),
                item_count: 0,
                processing_time_ms,
                error: message,
            },
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let parser = journal_parser(&config)?;

    let paths: Vec<PathBuf> = glob(&args.pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    if paths.is_empty() {
        anyhow::bail!("No journal files match {}", args.pattern);
    }

    println!("{} Parsing {} journals", style("ℹ").blue(), paths.len());

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
    }

    let outcomes = parse_all(paths, &parser, args.jobs).await?;

    for outcome in &outcomes {
        if let Err(message) = &outcome.result {
            if !args.continue_on_error {
                error!("Failed to parse {}: {}", outcome.path.display(), message);
                anyhow::bail!("Processing failed: {}", message);
            }
            warn!("Skipping {}: {}", outcome.path.display(), message);
        }
    }

    if let Some(dir) = &args.output_dir {
        for outcome in &outcomes {
            if let Ok(receipt) = &outcome.result {
                write_receipt(dir, &outcome.path, receipt, args.format)?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_deref()
            .unwrap_or(Path::new("."))
            .join("summary.csv");

        write_summary(&summary_path, &outcomes)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    print_report(&outcomes, start.elapsed());

    Ok(())
}

/// Parse files on blocking worker threads, at most `jobs` at a time.
/// Outcomes keep the order of `paths`.
async fn parse_all(
    paths: Vec<PathBuf>,
    parser: &JournalParser,
    jobs: usize,
) -> anyhow::Result<Vec<FileOutcome>> {
    let limit = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = Vec::with_capacity(paths.len());

    for path in paths {
        let permit = Arc::clone(&limit).acquire_owned().await?;
        let parser = parser.clone();

        tasks.push(tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let result = parse_file(&parser, &path).map_err(|e| e.to_string());
            drop(permit);

            FileOutcome {
                path,
                result,
                elapsed: started.elapsed(),
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        outcomes.push(task.await?);
    }

    Ok(outcomes)
}

fn write_receipt(dir: &Path, source: &Path, receipt: &Receipt, format: OutputFormat) -> anyhow::Result<()> {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("receipt");
    let path = dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&path, format_receipts(std::slice::from_ref(receipt), format)?)?;
    debug!("Wrote {}", path.display());

    Ok(())
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for outcome in outcomes {
        wtr.serialize(SummaryRow::new(outcome))?;
    }
    wtr.flush()?;

    Ok(())
}

fn print_report(outcomes: &[FileOutcome], elapsed: Duration) {
    let failed: Vec<&FileOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    let parsed = outcomes.len() - failed.len();

    println!();
    println!(
        "{} {} journals in {:?}: {} successful, {} failed",
        style("✓").green(),
        outcomes.len(),
        elapsed,
        style(parsed).green(),
        style(failed.len()).red()
    );

    for outcome in failed {
        if let Err(message) = &outcome.result {
            println!("  {} {}", style("✗").red(), message);
        }
    }
}
