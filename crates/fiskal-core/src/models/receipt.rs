//! Fiscal receipt data model.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::AmountValue;

/// A fully parsed fiscal receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Store that issued the receipt.
    pub store: Store,

    /// PFR receipt number (e.g. `746DUV64-746DUV64-16898`).
    pub number: String,

    /// Receipt counter with type suffix (e.g. `16887/16898ПП`).
    pub counter: String,

    /// Sale/refund and invoice type classification.
    pub receipt_type: ReceiptType,

    /// Labelled header lines such as the cashier and ESIR number.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    /// Items in receipt order.
    pub items: Vec<ReceiptItem>,

    /// Tax totals in tax table order.
    pub tax_items: Vec<TaxItem>,

    /// Payment summary lines (total, cash, card, change...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub payment_summary: BTreeMap<String, AmountValue>,

    pub total_purchase_amount: AmountValue,

    pub total_refund_amount: AmountValue,

    pub total_tax_amount: AmountValue,

    /// Fiscalization time in the business timezone.
    pub date: DateTime<FixedOffset>,

    /// Base64 GIF of the verification QR code, without the data URI prefix.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub qr_code: String,
}

impl Receipt {
    /// Look up the tax an item was charged under.
    pub fn tax_for(&self, item: &ReceiptItem) -> Option<&Tax> {
        self.tax_items
            .iter()
            .rev()
            .map(|tax_item| &tax_item.tax)
            .find(|tax| tax.identifier == item.tax_identifier)
    }

    /// Sum of all item totals.
    pub fn items_total(&self) -> AmountValue {
        self.items.iter().map(|item| item.total_amount).sum()
    }

    /// Whether this receipt returns money to the buyer.
    pub fn is_refund(&self) -> bool {
        self.receipt_type.is_refund()
    }
}

/// Identity of the issuing store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Company legal name, joined from every line it spans.
    pub company_name: String,

    /// Tax identification number (PIB).
    pub tin: String,

    pub location_id: String,

    pub location_name: String,

    pub address: String,

    pub city: String,
}

/// A tax type from the receipt's tax table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tax {
    /// Tax name (e.g. `О-ПДВ`, `Без ПДВ`).
    pub name: String,

    /// Short label used by item lines to reference this tax (e.g. `Ђ`).
    pub identifier: String,

    /// Rate in whole percent.
    pub rate: u32,
}

/// Aggregate amount charged under one tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxItem {
    pub tax: Tax,
    pub amount: AmountValue,
}

/// A single receipt line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// Item name without item codes, unit or tax label.
    pub name: String,

    /// Quantity (may be fractional for weighed goods).
    pub quantity: Decimal,

    /// Upper-cased unit of measure (e.g. `KOM`, `KG`).
    pub unit: String,

    /// Identifier of the tax this item is charged under.
    pub tax_identifier: String,

    pub unit_price: AmountValue,

    /// Line total; negative on refunds.
    pub total_amount: AmountValue,
}

/// Receipt classification by invoice type and transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptType {
    /// Промет Продаја
    #[default]
    NormalSale,
    /// Промет Рефундација
    NormalRefund,
    /// Аванс Продаја
    AdvanceSale,
    /// Аванс Рефундација
    AdvanceRefund,
    /// Обука Продаја
    TrainingSale,
    /// Обука Рефундација
    TrainingRefund,
    /// Копија Продаја
    CopySale,
    /// Копија Рефундација
    CopyRefund,
    /// Предрачун Продаја
    ProformaSale,
    /// Предрачун Рефундација
    ProformaRefund,
}

/// Rows are invoice types (normal, proforma, copy, training, advance),
/// columns are transaction types (sale, refund).
const TYPE_MATRIX: [[ReceiptType; 2]; 5] = [
    [ReceiptType::NormalSale, ReceiptType::NormalRefund],
    [ReceiptType::ProformaSale, ReceiptType::ProformaRefund],
    [ReceiptType::CopySale, ReceiptType::CopyRefund],
    [ReceiptType::TrainingSale, ReceiptType::TrainingRefund],
    [ReceiptType::AdvanceSale, ReceiptType::AdvanceRefund],
];

impl ReceiptType {
    pub const ALL: [ReceiptType; 10] = [
        ReceiptType::NormalSale,
        ReceiptType::NormalRefund,
        ReceiptType::AdvanceSale,
        ReceiptType::AdvanceRefund,
        ReceiptType::TrainingSale,
        ReceiptType::TrainingRefund,
        ReceiptType::CopySale,
        ReceiptType::CopyRefund,
        ReceiptType::ProformaSale,
        ReceiptType::ProformaRefund,
    ];

    /// Look up the type for an (invoice type, transaction type) pair.
    pub fn from_codes(invoice_type: u8, transaction_type: u8) -> Option<Self> {
        TYPE_MATRIX
            .get(usize::from(invoice_type))?
            .get(usize::from(transaction_type))
            .copied()
    }

    /// Parse the two-letter suffix of a receipt counter (e.g. `ПП`).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Two-letter Cyrillic code printed after the receipt counter.
    pub fn code(&self) -> &'static str {
        match self {
            ReceiptType::NormalSale => "ПП",
            ReceiptType::NormalRefund => "ПР",
            ReceiptType::AdvanceSale => "АП",
            ReceiptType::AdvanceRefund => "АР",
            ReceiptType::TrainingSale => "ОП",
            ReceiptType::TrainingRefund => "ОР",
            ReceiptType::CopySale => "КП",
            ReceiptType::CopyRefund => "КР",
            ReceiptType::ProformaSale => "РП",
            ReceiptType::ProformaRefund => "РР",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReceiptType::NormalSale => "normal sale",
            ReceiptType::NormalRefund => "normal refund",
            ReceiptType::AdvanceSale => "advance sale",
            ReceiptType::AdvanceRefund => "advance refund",
            ReceiptType::TrainingSale => "training sale",
            ReceiptType::TrainingRefund => "training refund",
            ReceiptType::CopySale => "copy sale",
            ReceiptType::CopyRefund => "copy refund",
            ReceiptType::ProformaSale => "proforma sale",
            ReceiptType::ProformaRefund => "proforma refund",
        }
    }

    pub fn is_refund(&self) -> bool {
        matches!(
            self,
            ReceiptType::NormalRefund
                | ReceiptType::AdvanceRefund
                | ReceiptType::TrainingRefund
                | ReceiptType::CopyRefund
                | ReceiptType::ProformaRefund
        )
    }
}
