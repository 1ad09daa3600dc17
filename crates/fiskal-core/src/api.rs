//! Mapping of fiscal API JSON responses onto [`Receipt`].
//!
//! The response carries store and totals as structured fields and the
//! printed journal as text. Items, taxes and payments come from the journal.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, PayloadError};
use crate::journal::{JournalParser, ReceiptParser};
use crate::models::amount::AmountValue;
use crate::models::receipt::{Receipt, ReceiptType, Store};
use crate::models::to_fixed_offset;

/// Top-level keys every response must have.
pub const REQUIRED_FIELDS: [&str; 3] = ["invoiceRequest", "invoiceResult", "journal"];

/// Invoice request part of a response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub business_name: String,
    pub tax_id: String,
    /// `<location id>-<location name>`
    pub location_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub administrative_unit: String,
    pub invoice_type: u8,
    pub transaction_type: u8,
}

/// Invoice result part of a response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResult {
    pub sdc_time: String,
    pub total_amount: f64,
    pub invoice_number: String,
    pub transaction_type_counter: u64,
    pub total_counter: u64,
    #[serde(default)]
    pub invoice_counter_extension: String,
}

/// A fiscal API response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub invoice_request: InvoiceRequest,
    pub invoice_result: InvoiceResult,
    pub journal: String,
}

/// Parser for fiscal API responses.
#[derive(Debug, Clone, Default)]
pub struct ApiResponseParser {
    journal: JournalParser,
}

impl ApiResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a configured journal parser for the embedded journal.
    pub fn with_journal_parser(mut self, journal: JournalParser) -> Self {
        self.journal = journal;
        self
    }

    /// Map a decoded JSON response onto a receipt.
    pub fn parse_value(&self, value: &Value) -> Result<Receipt, ApiError> {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .into_iter()
            .filter(|field| value.get(field).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(ApiError::MissingApiFields(missing));
        }

        let response = ApiResponse::deserialize(value)?;
        self.map_response(response)
    }

    fn map_response(&self, response: ApiResponse) -> Result<Receipt, ApiError> {
        let request = &response.invoice_request;
        let result = &response.invoice_result;

        let (location_id, location_name) =
            request
                .location_name
                .split_once('-')
                .ok_or_else(|| ApiError::InvalidField {
                    field: "locationName",
                    value: request.location_name.clone(),
                })?;

        let store = Store {
            company_name: request.business_name.trim().to_string(),
            tin: request.tax_id.trim().to_string(),
            location_id: location_id.trim().to_string(),
            location_name: location_name.trim().to_string(),
            address: request.address.trim().to_string(),
            city: request.administrative_unit.trim().to_string(),
        };

        let journal = self
            .journal
            .parse_journal(&response.journal.replace("\r\n", "\n"))?;

        let receipt_type = ReceiptType::from_codes(request.invoice_type, request.transaction_type)
            .ok_or(PayloadError::UnknownReceiptType {
                invoice_type: request.invoice_type,
                transaction_type: request.transaction_type,
            })?;

        let total = AmountValue::from_float(result.total_amount);
        let (total_purchase_amount, total_refund_amount) = if request.transaction_type == 0 {
            (total, AmountValue::ZERO)
        } else {
            (AmountValue::ZERO, total)
        };

        debug!("Mapped API response for receipt {}", result.invoice_number);

        Ok(Receipt {
            store,
            number: result.invoice_number.clone(),
            counter: format!(
                "{}/{}{}",
                result.transaction_type_counter, result.total_counter, result.invoice_counter_extension
            ),
            receipt_type,
            meta: journal.meta,
            items: journal.items,
            tax_items: journal.tax_items,
            payment_summary: journal.payment_summary,
            total_purchase_amount,
            total_refund_amount,
            total_tax_amount: journal.total_tax_amount,
            date: self.parse_sdc_time(&result.sdc_time)?,
            qr_code: journal.qr_code,
        })
    }

    /// RFC 3339 time, or a local time without offset in the business timezone.
    fn parse_sdc_time(&self, text: &str) -> Result<DateTime<chrono::FixedOffset>, ApiError> {
        let timezone = self.journal.timezone();

        if let Ok(date) = DateTime::parse_from_rfc3339(text) {
            return Ok(to_fixed_offset(date.with_timezone(&timezone)));
        }

        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .and_then(|naive| timezone.from_local_datetime(&naive).earliest())
            .map(to_fixed_offset)
            .ok_or_else(|| ApiError::InvalidField {
                field: "sdcTime",
                value: text.to_string(),
            })
    }
}

impl ReceiptParser for ApiResponseParser {
    fn parse(&self, input: &str) -> crate::Result<Receipt> {
        let value: Value = serde_json::from_str(input).map_err(ApiError::from)?;
        Ok(self.parse_value(&value)?)
    }
}
