//! Receipt assembly from fiscal journal text.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::error::JournalError;
use crate::models::amount::AmountValue;
use crate::models::config::JournalConfig;
use crate::models::receipt::{Receipt, ReceiptType};
use crate::models::to_fixed_offset;

use super::rules::{
    key_value::extract_pairs,
    patterns::*,
    ItemLineExtractor, SectionExtractor, StoreExtractor, TaxTableExtractor,
};
use super::sections::split_journal;
use super::Result;

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt from its text representation.
    fn parse(&self, input: &str) -> crate::Result<Receipt>;
}

/// Parser for the plain-text fiscal journal printed by cash registers.
#[derive(Debug, Clone)]
pub struct JournalParser {
    /// Timezone the fiscalization time is printed in.
    timezone: Tz,
    /// Unit for items that print none.
    default_unit: String,
    /// Whether an unreadable fiscalization time falls back to now.
    fallback_to_now: bool,
}

impl JournalParser {
    /// Create a parser for Europe/Belgrade journals.
    pub fn new() -> Self {
        Self {
            timezone: chrono_tz::Europe::Belgrade,
            default_unit: "KOM".to_string(),
            fallback_to_now: true,
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &JournalConfig) -> crate::Result<Self> {
        Ok(Self::new()
            .with_timezone(config.timezone()?)
            .with_default_unit(config.default_unit.clone())
            .with_fallback_to_now(config.fallback_to_now))
    }

    /// Set the business timezone.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the unit used for items without one.
    pub fn with_default_unit(mut self, unit: impl Into<String>) -> Self {
        self.default_unit = unit.into();
        self
    }

    /// Set whether an unreadable fiscalization time falls back to now.
    pub fn with_fallback_to_now(mut self, fallback: bool) -> Self {
        self.fallback_to_now = fallback;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Parse journal text into a receipt.
    pub fn parse_journal(&self, text: &str) -> Result<Receipt> {
        let start = Instant::now();

        let text = text.replace("\r\n", "\n");
        let sections = split_journal(text.trim())?;

        let store = StoreExtractor::new().extract(sections.header)?;
        let meta: BTreeMap<String, String> = extract_pairs(sections.header).into_iter().collect();

        let tax_table = TaxTableExtractor::new().extract(sections.taxes)?;
        let items = ItemLineExtractor::new(&tax_table)?
            .with_default_unit(self.default_unit.as_str())
            .extract(sections.items)?;

        let payment_summary: BTreeMap<String, AmountValue> = extract_pairs(sections.payments)
            .into_iter()
            .map(|(label, value)| (label, AmountValue::parse(&value)))
            .collect();

        let fiscalization = extract_pairs(sections.fiscalization);
        let date = self.parse_date(fiscalization.get(LABEL_FISCALIZATION_TIME).unwrap_or_default())?;
        let number = fiscalization.get(LABEL_RECEIPT_NUMBER).unwrap_or_default().to_string();
        let counter = fiscalization.get(LABEL_RECEIPT_COUNTER).unwrap_or_default().to_string();
        let receipt_type = receipt_type_from_counter(&counter);

        let amount = |label: &str| payment_summary.get(label).copied().unwrap_or_default();
        let total_purchase_amount = amount(LABEL_TOTAL_PURCHASE);
        let total_refund_amount = amount(LABEL_TOTAL_REFUND);

        let receipt = Receipt {
            store,
            number,
            counter,
            receipt_type,
            meta,
            items,
            total_tax_amount: tax_table.total_tax,
            tax_items: tax_table.items,
            payment_summary,
            total_purchase_amount,
            total_refund_amount,
            date,
            qr_code: extract_qr_code(sections.qr_code),
        };

        info!(
            "Parsed {} receipt {} with {} items in {:?}",
            receipt.receipt_type.label(),
            receipt.number,
            receipt.items.len(),
            start.elapsed()
        );

        Ok(receipt)
    }

    fn parse_date(&self, text: &str) -> Result<DateTime<FixedOffset>> {
        let local = NaiveDateTime::parse_from_str(text, FISCALIZATION_TIME_FORMAT)
            .ok()
            .and_then(|naive| self.timezone.from_local_datetime(&naive).earliest());

        match local {
            Some(date) => Ok(to_fixed_offset(date)),
            None if self.fallback_to_now => {
                warn!("Unreadable fiscalization time {:?}, using current time", text);
                Ok(to_fixed_offset(Utc::now().with_timezone(&self.timezone)))
            }
            None => Err(JournalError::StructuralMismatch(format!(
                "unreadable fiscalization time: {:?}",
                text
            ))),
        }
    }
}

impl Default for JournalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for JournalParser {
    fn parse(&self, input: &str) -> crate::Result<Receipt> {
        Ok(self.parse_journal(input)?)
    }
}

/// Receipt type from the two-letter suffix of the counter, e.g. `16887/16898ПП`.
fn receipt_type_from_counter(counter: &str) -> ReceiptType {
    let start = counter
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(index, _)| index);

    ReceiptType::from_code(&counter[start..]).unwrap_or_else(|| {
        debug!("Unknown receipt type in counter {:?}", counter);
        ReceiptType::default()
    })
}

/// Base64 QR code image from the `<img>` element of the last section.
fn extract_qr_code(section: &str) -> String {
    if section.trim().is_empty() {
        return String::new();
    }

    IMAGE_SOURCE
        .captures(section)
        .and_then(|caps| caps.get(1))
        .map(|source| {
            let source = source.as_str();
            source.strip_prefix(QR_CODE_PREFIX).unwrap_or(source).to_string()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_type_from_counter() {
        assert_eq!(receipt_type_from_counter("16887/16898ПП"), ReceiptType::NormalSale);
        assert_eq!(receipt_type_from_counter("120/3456ПР"), ReceiptType::NormalRefund);
        assert_eq!(receipt_type_from_counter("12/40РП"), ReceiptType::ProformaSale);
        assert_eq!(receipt_type_from_counter("12/40"), ReceiptType::NormalSale);
        assert_eq!(receipt_type_from_counter(""), ReceiptType::NormalSale);
    }

    #[test]
    fn test_extract_qr_code() {
        let section = "\n<img src=\"data:image/gif;base64,R0lGODlhhACEAPcAAA==\" width=\"250\" height=\"250\" />\n";
        assert_eq!(extract_qr_code(section), "R0lGODlhhACEAPcAAA==");
        assert_eq!(extract_qr_code("\n\n"), "");
        assert_eq!(extract_qr_code("no image"), "");
    }

    #[test]
    fn test_parse_date() {
        let parser = JournalParser::new();
        let date = parser.parse_date("31.12.2022. 15:51:57").unwrap();

        assert_eq!(date.format("%Y-%m-%d %H:%M:%S").to_string(), "2022-12-31 15:51:57");
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_date_without_fallback() {
        let parser = JournalParser::new().with_fallback_to_now(false);

        assert!(matches!(
            parser.parse_date("31.12.2022"),
            Err(JournalError::StructuralMismatch(_))
        ));
        assert!(JournalParser::new().parse_date("31.12.2022").is_ok());
    }
}
