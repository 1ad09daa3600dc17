//! Tax table extraction.

use tracing::debug;

use super::key_value::extract_pairs;
use super::patterns::{COLUMN_GAP, LABEL_TOTAL_TAX, SUB_DELIMITER};
use super::SectionExtractor;
use crate::error::JournalError;
use crate::journal::Result;
use crate::models::amount::{leading_integer, AmountValue};
use crate::models::receipt::{Tax, TaxItem};

/// Parsed tax table: one entry per tax plus the declared tax total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxTable {
    pub items: Vec<TaxItem>,
    pub total_tax: AmountValue,
}

impl TaxTable {
    /// Look up a tax by identifier, falling back to a case-insensitive match.
    ///
    /// When an identifier is listed twice the later row wins.
    pub fn find(&self, identifier: &str) -> Option<&Tax> {
        let taxes = || self.items.iter().rev().map(|item| &item.tax);

        taxes()
            .find(|tax| tax.identifier == identifier)
            .or_else(|| {
                let folded = identifier.to_lowercase();
                taxes().find(|tax| tax.identifier.to_lowercase() == folded)
            })
    }

    /// Distinct identifiers in table order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !identifiers.contains(&item.tax.identifier.as_str()) {
                identifiers.push(&item.tax.identifier);
            }
        }
        identifiers
    }
}

/// Tax table extractor.
///
/// The first line is the column legend. Each row holds identifier, name,
/// rate and amount separated by runs of two or more spaces. The row after
/// the sub-delimiter carries the tax total.
#[derive(Debug, Clone, Default)]
pub struct TaxTableExtractor;

impl TaxTableExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse_row(line: &str) -> Result<TaxItem> {
        let fields: Vec<&str> = COLUMN_GAP.splitn(line, 4).collect();

        let [identifier, name, rate, amount] = fields.as_slice() else {
            return Err(JournalError::MalformedRow {
                section: "tax table",
                line: line.to_string(),
            });
        };

        let (_, rate) = leading_integer(rate);

        Ok(TaxItem {
            tax: Tax {
                name: name.to_string(),
                identifier: identifier.to_string(),
                rate: u32::try_from(rate).unwrap_or(u32::MAX),
            },
            amount: AmountValue::parse(amount),
        })
    }
}

impl SectionExtractor for TaxTableExtractor {
    type Output = TaxTable;

    fn extract(&self, text: &str) -> Result<Self::Output> {
        let mut table = TaxTable::default();
        let mut lines = text.trim().lines().skip(1);

        while let Some(line) = lines.next() {
            let line = line.trim();

            if line == SUB_DELIMITER {
                let totals = extract_pairs(lines.next().unwrap_or_default());
                table.total_tax = totals.get(LABEL_TOTAL_TAX).map(AmountValue::parse).unwrap_or_default();
                break;
            }

            if line.is_empty() {
                continue;
            }

            table.items.push(Self::parse_row(line)?);
        }

        debug!("Extracted {} tax rows, total tax {}", table.items.len(), table.total_tax);

        Ok(table)
    }
}

/// Extract the tax table from its journal section.
pub fn extract_tax_table(text: &str) -> Result<TaxTable> {
    TaxTableExtractor::new().extract(text)
}
