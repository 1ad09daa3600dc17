//! Item line extraction.
//!
//! An item is printed as one or more descriptor lines (name, optional item
//! code, optional unit and the tax label in parentheses) followed by a line
//! ending in price, quantity and total columns. Descriptors are matched
//! against [`DescriptorVariant::PRIORITY`] in order and the first full match
//! wins. Looser variants would otherwise read a numeric item code as part of
//! the name, so the order must not change.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::patterns::{
    AMOUNT_LINE, ITEM_CODE_PREFIX, ITEM_CODE_SUFFIX, ITEM_NAME, TRAILING_TAX_TOKEN, UNIT_PATTERN,
};
use super::taxes::TaxTable;
use super::SectionExtractor;
use crate::error::JournalError;
use crate::journal::Result;
use crate::models::amount::AmountValue;
use crate::models::receipt::ReceiptItem;

/// Layout of an item descriptor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorVariant {
    /// `0252491 NAME KOM (Ђ)`
    PrefixCodeWithUnit,
    /// `NAME/100234 L (Ђ)`
    SuffixCodeWithUnit,
    /// `NAME KG 123456 (Е)`
    UnitThenSuffixCode,
    /// `NAME KG (Е)`
    UnitOnly,
    /// `[123456] NAME (Ђ)`
    PrefixCode,
    /// `NAME #123456 (Ђ)`
    SuffixCode,
    /// `NAME (Ђ)`
    NameOnly,
}

impl DescriptorVariant {
    /// Variants in matching order, most specific first.
    pub const PRIORITY: [DescriptorVariant; 7] = [
        DescriptorVariant::PrefixCodeWithUnit,
        DescriptorVariant::SuffixCodeWithUnit,
        DescriptorVariant::UnitThenSuffixCode,
        DescriptorVariant::UnitOnly,
        DescriptorVariant::PrefixCode,
        DescriptorVariant::SuffixCode,
        DescriptorVariant::NameOnly,
    ];

    /// Whether the variant captures a unit of measure.
    pub fn has_unit(&self) -> bool {
        matches!(
            self,
            DescriptorVariant::PrefixCodeWithUnit
                | DescriptorVariant::SuffixCodeWithUnit
                | DescriptorVariant::UnitThenSuffixCode
                | DescriptorVariant::UnitOnly
        )
    }

    /// Full-line pattern for this variant, ending in the given tax fragment.
    fn pattern(&self, tax: &str) -> String {
        let unit = UNIT_PATTERN.as_str();
        let body = match self {
            DescriptorVariant::PrefixCodeWithUnit => format!("{ITEM_CODE_PREFIX}{ITEM_NAME}{unit}"),
            DescriptorVariant::SuffixCodeWithUnit => format!("{ITEM_NAME}{ITEM_CODE_SUFFIX}{unit}"),
            DescriptorVariant::UnitThenSuffixCode => format!("{ITEM_NAME}{unit}{ITEM_CODE_SUFFIX}"),
            DescriptorVariant::UnitOnly => format!("{ITEM_NAME}{unit}"),
            DescriptorVariant::PrefixCode => format!("{ITEM_CODE_PREFIX}{ITEM_NAME}"),
            DescriptorVariant::SuffixCode => format!("{ITEM_NAME}{ITEM_CODE_SUFFIX}"),
            DescriptorVariant::NameOnly => ITEM_NAME.to_string(),
        };

        format!("(?i)^{body}{tax}$")
    }
}

/// Parts of a matched descriptor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorMatch {
    pub variant: DescriptorVariant,
    /// Trimmed item name.
    pub name: String,
    /// Upper-cased unit, if the line has one.
    pub unit: Option<String>,
    /// Tax identifier as printed.
    pub tax_identifier: String,
}

/// Item line extractor bound to one receipt's tax table.
pub struct ItemLineExtractor<'a> {
    taxes: &'a TaxTable,
    variants: Vec<(DescriptorVariant, Regex)>,
    default_unit: String,
}

impl<'a> ItemLineExtractor<'a> {
    /// Build the descriptor patterns for the identifiers in `taxes`.
    pub fn new(taxes: &'a TaxTable) -> Result<Self> {
        let identifiers: Vec<String> = taxes
            .identifiers()
            .into_iter()
            .map(regex::escape)
            .collect();
        let tax = format!(r" ?\((?P<tax>{})\)", identifiers.join("|"));

        let variants = DescriptorVariant::PRIORITY
            .iter()
            .map(|variant| {
                Regex::new(&variant.pattern(&tax))
                    .map(|regex| (*variant, regex))
                    .map_err(|e| JournalError::Pattern(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            taxes,
            variants,
            default_unit: "KOM".to_string(),
        })
    }

    /// Set the unit used when a descriptor names none.
    pub fn with_default_unit(mut self, unit: impl Into<String>) -> Self {
        self.default_unit = unit.into();
        self
    }

    /// Match a descriptor line against the variants in priority order.
    pub fn match_descriptor(&self, descriptor: &str) -> Result<DescriptorMatch> {
        for (variant, regex) in &self.variants {
            let Some(caps) = regex.captures(descriptor) else {
                continue;
            };

            trace!("Descriptor {:?} matched {:?}", descriptor, variant);

            return Ok(DescriptorMatch {
                variant: *variant,
                name: caps.name("name").map_or("", |m| m.as_str()).trim().to_string(),
                unit: caps.name("unit").map(|m| m.as_str().trim().to_uppercase()),
                tax_identifier: caps.name("tax").map_or("", |m| m.as_str()).to_string(),
            });
        }

        Err(match TRAILING_TAX_TOKEN.captures(descriptor) {
            Some(caps) if self.taxes.find(&caps["tax"]).is_none() => {
                JournalError::UnknownTaxIdentifier {
                    identifier: caps["tax"].to_string(),
                    line: descriptor.to_string(),
                }
            }
            _ => JournalError::UnrecognizedItemLine(descriptor.to_string()),
        })
    }

    fn build_item(&self, descriptor: &str, amounts: &regex::Captures<'_>) -> Result<ReceiptItem> {
        let matched = self.match_descriptor(descriptor)?;

        let tax = self.taxes.find(&matched.tax_identifier).ok_or_else(|| {
            JournalError::UnknownTaxIdentifier {
                identifier: matched.tax_identifier.clone(),
                line: descriptor.to_string(),
            }
        })?;

        Ok(ReceiptItem {
            name: matched.name,
            quantity: parse_quantity(&amounts[2]),
            unit: matched.unit.unwrap_or_else(|| self.default_unit.clone()),
            tax_identifier: tax.identifier.clone(),
            unit_price: AmountValue::parse(&amounts[1]),
            total_amount: AmountValue::parse(&amounts[3]),
        })
    }
}

impl SectionExtractor for ItemLineExtractor<'_> {
    type Output = Vec<ReceiptItem>;

    /// Extract items from the item block. The first line is the column legend.
    fn extract(&self, text: &str) -> Result<Self::Output> {
        let mut items = Vec::new();
        let mut pending = String::new();

        for line in text.trim().lines().skip(1) {
            let Some(amounts) = AMOUNT_LINE.captures(line.trim_end()) else {
                // Fixed-width wrapping splits mid-word, so lines join as-is.
                pending.push_str(line);
                continue;
            };

            items.push(self.build_item(pending.trim(), &amounts)?);
            pending.clear();
        }

        if !pending.trim().is_empty() {
            debug!("Dropping descriptor without amounts: {:?}", pending.trim());
        }

        debug!("Extracted {} items", items.len());

        Ok(items)
    }
}

/// Parse a quantity with dot thousands separators and a decimal comma.
pub fn parse_quantity(text: &str) -> Decimal {
    let text = text.trim();
    let (integer, fraction) = text.split_once(',').unwrap_or((text, ""));
    let integer: String = integer.chars().filter(|c| *c != '.').collect();

    let number = if fraction.is_empty() {
        integer
    } else {
        format!("{integer}.{fraction}")
    };

    Decimal::from_str(&number)
        .map(|quantity| quantity.normalize())
        .unwrap_or_default()
}
