//! Url command - decode a receipt verification URL.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use fiskal_core::UrlDecoder;

use super::load_config;
use super::output::{format_payload, write_output, OutputFormat};

/// Arguments for the url command.
#[derive(Args)]
pub struct UrlArgs {
    /// Verification URL (the QR code contents)
    #[arg(required = true)]
    url: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Decode even when the payload checksum does not match
    #[arg(long)]
    skip_hash_check: bool,
}

pub async fn run(args: UrlArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut decoder = UrlDecoder::from_config(&config.url);
    if args.skip_hash_check {
        decoder = decoder.with_hash_verification(false);
    }

    info!("Decoding verification URL");
    let payload = decoder.decode(&args.url)?;

    if payload.receipt_type().is_err() {
        eprintln!(
            "{} Unknown receipt type (invoice type {}, transaction type {})",
            style("!").yellow(),
            payload.invoice_type,
            payload.transaction_type
        );
    }

    let output = format_payload(&payload, args.format)?;
    write_output(&output, args.output.as_deref())
}
