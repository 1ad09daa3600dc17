//! Journal and API commands - parse receipts from files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use tracing::{debug, info};

use fiskal_core::{ApiResponseParser, FiskalConfig, JournalParser, Receipt, ReceiptParser};

use super::load_config;
use super::output::{format_receipts, write_output, OutputFormat};

/// Arguments for the journal command.
#[derive(Args)]
pub struct JournalArgs {
    /// Journal text files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Fail instead of using the current time when the fiscalization time is unreadable
    #[arg(long)]
    strict_time: bool,
}

/// Arguments for the api command.
#[derive(Args)]
pub struct ApiArgs {
    /// API response JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

/// Build the journal parser the config describes.
pub fn journal_parser(config: &FiskalConfig) -> anyhow::Result<JournalParser> {
    Ok(JournalParser::from_config(&config.journal)?)
}

pub async fn run_journal(args: JournalArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let mut parser = journal_parser(&config)?;
    if args.strict_time {
        parser = parser.with_fallback_to_now(false);
    }

    let mut receipts = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        receipts.push(parse_file(&parser, input)?);
    }

    let output = format_receipts(&receipts, args.format)?;
    write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub async fn run_api(args: ApiArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = ApiResponseParser::new().with_journal_parser(journal_parser(&config)?);
    let receipt = parse_file(&parser, &args.input)?;

    let output = format_receipts(std::slice::from_ref(&receipt), args.format)?;
    write_output(&output, args.output.as_deref())
}

/// Read a file and parse it with any receipt parser.
pub fn parse_file(parser: &impl ReceiptParser, path: &Path) -> anyhow::Result<Receipt> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    info!("Processing file: {}", path.display());

    let text = fs::read_to_string(path)?;
    let receipt = parser
        .parse(&text)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

    debug!("Parsed receipt {} with {} items", receipt.number, receipt.items.len());

    Ok(receipt)
}
