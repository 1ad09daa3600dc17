//! Decoded verification URL payload.

use chrono::{DateTime, FixedOffset, TimeZone};
use chrono_tz::Europe::Belgrade;
use serde::{Deserialize, Serialize};

use super::amount::AmountValue;
use super::receipt::ReceiptType;
use super::to_fixed_offset;
use crate::error::PayloadError;

/// Fields carried by the binary payload of a verification URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPayload {
    /// Payload format version.
    pub version: u8,

    /// Identifier of the device that requested the signature.
    pub requested_by: String,

    /// Identifier of the device that signed the receipt.
    pub signed_by: String,

    pub total_counter: u32,

    pub transaction_type_counter: u32,

    /// Total amount with 4 implied decimal digits.
    pub total_amount: u64,

    /// Fiscalization time in milliseconds since the Unix epoch.
    pub date_and_time: u64,

    pub invoice_type: u8,

    pub transaction_type: u8,

    pub buyer_id_length: u8,

    pub buyer_id: Option<String>,

    /// Hex encoded encrypted internal data block.
    pub encrypted_internal_data: String,

    /// Hex encoded signature block.
    pub signature: String,

    /// Hex encoded trailing checksum.
    pub hash: String,
}

impl UrlPayload {
    /// Receipt type for the payload's invoice and transaction type codes.
    pub fn receipt_type(&self) -> Result<ReceiptType, PayloadError> {
        ReceiptType::from_codes(self.invoice_type, self.transaction_type).ok_or(
            PayloadError::UnknownReceiptType {
                invoice_type: self.invoice_type,
                transaction_type: self.transaction_type,
            },
        )
    }

    /// Total amount truncated to whole paras.
    pub fn total_amount_value(&self) -> AmountValue {
        AmountValue::from_paras((self.total_amount / 100) as i64)
    }

    pub fn buyer_id(&self) -> Option<&str> {
        self.buyer_id.as_deref()
    }

    /// PFR receipt number, `{requested_by}-{signed_by}-{total_counter}`.
    pub fn receipt_number(&self) -> String {
        format!("{}-{}-{}", self.requested_by, self.signed_by, self.total_counter)
    }

    /// Receipt counter with type code, e.g. `26878/76722ПП`.
    pub fn receipt_counter(&self) -> Result<String, PayloadError> {
        let receipt_type = self.receipt_type()?;
        Ok(format!(
            "{}/{}{}",
            self.transaction_type_counter,
            self.total_counter,
            receipt_type.code()
        ))
    }

    /// Fiscalization time in Europe/Belgrade.
    pub fn receipt_date(&self) -> Result<DateTime<FixedOffset>, PayloadError> {
        self.receipt_date_in(&Belgrade)
    }

    /// Fiscalization time in the given timezone, keeping millisecond precision.
    pub fn receipt_date_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<FixedOffset>, PayloadError> {
        let millis = i64::try_from(self.date_and_time)
            .map_err(|_| PayloadError::InvalidTimestamp(self.date_and_time))?;
        let utc = DateTime::from_timestamp_millis(millis)
            .ok_or(PayloadError::InvalidTimestamp(self.date_and_time))?;

        Ok(to_fixed_offset(utc.with_timezone(tz)))
    }
}
