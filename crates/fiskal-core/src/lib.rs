//! Core library for Serbian fiscal receipt processing.
//!
//! This crate provides:
//! - Fiscal journal text parsing (store, items, taxes, payments, fiscalization data)
//! - Verification URL payload decoding with checksum verification
//! - Mapping of fiscal API responses onto the same receipt model

pub mod error;
pub mod models;
pub mod journal;
pub mod verification;
pub mod api;

pub use error::{ApiError, FiskalError, JournalError, PayloadError, Result};
pub use models::amount::AmountValue;
pub use models::config::FiskalConfig;
pub use models::payload::UrlPayload;
pub use models::receipt::{Receipt, ReceiptItem, ReceiptType, Store, Tax, TaxItem};
pub use journal::{JournalParser, ReceiptParser};
pub use verification::{decode_url, UrlDecoder};
pub use api::ApiResponseParser;
