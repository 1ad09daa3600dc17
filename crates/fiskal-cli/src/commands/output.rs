//! Output formatting shared by the subcommands.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use console::style;
use serde::Serialize;

use fiskal_core::{AmountValue, Receipt, ReceiptType, UrlPayload};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for output written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

const RECEIPT_CSV_HEADER: [&str; 15] = [
    "number",
    "counter",
    "receipt_type",
    "date",
    "company_name",
    "tin",
    "location_id",
    "location_name",
    "item_name",
    "quantity",
    "unit",
    "unit_price",
    "total_amount",
    "tax_identifier",
    "tax_rate",
];

/// Format one or more receipts. Several receipts become a JSON array.
pub fn format_receipts(receipts: &[Receipt], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => match receipts {
            [receipt] => Ok(serde_json::to_string_pretty(receipt)?),
            _ => Ok(serde_json::to_string_pretty(receipts)?),
        },
        OutputFormat::Csv => format_receipts_csv(receipts),
        OutputFormat::Text => Ok(receipts
            .iter()
            .map(format_receipt_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn format_receipts_csv(receipts: &[Receipt]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(RECEIPT_CSV_HEADER)?;

    for receipt in receipts {
        let date = receipt.date.to_rfc3339();
        let head = [
            receipt.number.as_str(),
            receipt.counter.as_str(),
            receipt.receipt_type.label(),
            date.as_str(),
            receipt.store.company_name.as_str(),
            receipt.store.tin.as_str(),
            receipt.store.location_id.as_str(),
            receipt.store.location_name.as_str(),
        ];

        if receipt.items.is_empty() {
            wtr.write_record(head.iter().copied().chain([""; 7]))?;
            continue;
        }

        for item in &receipt.items {
            let quantity = item.quantity.to_string();
            let unit_price = item.unit_price.as_decimal().to_string();
            let total_amount = item.total_amount.as_decimal().to_string();
            let rate = receipt
                .tax_for(item)
                .map(|tax| tax.rate.to_string())
                .unwrap_or_default();

            wtr.write_record(head.iter().copied().chain([
                item.name.as_str(),
                quantity.as_str(),
                item.unit.as_str(),
                unit_price.as_str(),
                total_amount.as_str(),
                item.tax_identifier.as_str(),
                rate.as_str(),
            ]))?;
        }
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_receipt_text(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt: {} ({})\n", receipt.number, receipt.counter));
    output.push_str(&format!("Type: {}\n", receipt.receipt_type.label()));
    output.push_str(&format!("Date: {}\n", receipt.date.format("%d.%m.%Y. %H:%M:%S")));
    output.push('\n');

    let store = &receipt.store;
    output.push_str(&format!("{}\n", style("Store:").bold()));
    output.push_str(&format!("  {} (PIB {})\n", store.company_name, store.tin));
    output.push_str(&format!("  {}-{}\n", store.location_id, store.location_name));
    if !store.address.is_empty() {
        output.push_str(&format!("  {}, {}\n", store.address, store.city));
    }
    output.push('\n');

    output.push_str(&format!("{}\n", style("Items:").bold()));
    for item in &receipt.items {
        output.push_str(&format!(
            "  {} {} {} x {} = {} ({})\n",
            item.name, item.quantity, item.unit, item.unit_price, item.total_amount, item.tax_identifier
        ));
    }
    output.push('\n');

    output.push_str(&format!("{}\n", style("Taxes:").bold()));
    for tax_item in &receipt.tax_items {
        output.push_str(&format!(
            "  {} {} {}%: {}\n",
            tax_item.tax.identifier, tax_item.tax.name, tax_item.tax.rate, tax_item.amount
        ));
    }
    output.push('\n');

    if receipt.is_refund() {
        output.push_str(&format!("Total refund: {}\n", receipt.total_refund_amount));
    } else {
        output.push_str(&format!("Total: {}\n", receipt.total_purchase_amount));
    }
    output.push_str(&format!("Tax: {}\n", receipt.total_tax_amount));

    output
}

/// Decoded payload together with the values derived from it.
#[derive(Serialize)]
struct PayloadReport<'a> {
    #[serde(flatten)]
    payload: &'a UrlPayload,
    receipt_number: String,
    receipt_counter: Option<String>,
    receipt_type: Option<ReceiptType>,
    amount: AmountValue,
    date: Option<DateTime<FixedOffset>>,
}

impl<'a> PayloadReport<'a> {
    fn new(payload: &'a UrlPayload) -> Self {
        Self {
            payload,
            receipt_number: payload.receipt_number(),
            receipt_counter: payload.receipt_counter().ok(),
            receipt_type: payload.receipt_type().ok(),
            amount: payload.total_amount_value(),
            date: payload.receipt_date().ok(),
        }
    }
}

/// Format a decoded verification URL payload.
pub fn format_payload(payload: &UrlPayload, format: OutputFormat) -> anyhow::Result<String> {
    let report = PayloadReport::new(payload);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => {
            let amount = report.amount.as_decimal().to_string();
            let date = report.date.map(|d| d.to_rfc3339()).unwrap_or_default();
            let version = payload.version.to_string();

            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record([
                "receipt_number",
                "receipt_counter",
                "receipt_type",
                "amount",
                "date",
                "buyer_id",
                "version",
            ])?;
            wtr.write_record([
                report.receipt_number.as_str(),
                report.receipt_counter.as_deref().unwrap_or(""),
                report.receipt_type.map(|t| t.label()).unwrap_or(""),
                amount.as_str(),
                date.as_str(),
                payload.buyer_id().unwrap_or(""),
                version.as_str(),
            ])?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Receipt: {}\n", report.receipt_number));
            if let Some(counter) = &report.receipt_counter {
                output.push_str(&format!("Counter: {}\n", counter));
            }
            match report.receipt_type {
                Some(receipt_type) => output.push_str(&format!("Type: {}\n", receipt_type.label())),
                None => output.push_str(&format!(
                    "Type: unknown ({}/{})\n",
                    payload.invoice_type, payload.transaction_type
                )),
            }
            output.push_str(&format!("Amount: {}\n", report.amount));
            if let Some(date) = report.date {
                output.push_str(&format!("Date: {}\n", date.format("%d.%m.%Y. %H:%M:%S")));
            }
            if let Some(buyer_id) = payload.buyer_id() {
                output.push_str(&format!("Buyer: {}\n", buyer_id));
            }
            Ok(output)
        }
    }
}

/// Write to a file when a path is given, else to stdout.
pub fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output_path) = output {
        fs::write(output_path, content)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", content);
    }

    Ok(())
}
