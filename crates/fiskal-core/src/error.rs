//! Error types for the fiskal-core library.

use thiserror::Error;

/// Main error type for the fiskal library.
#[derive(Error, Debug)]
pub enum FiskalError {
    /// Journal text parsing error.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// Verification URL payload error.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// API response mapping error.
    #[error("API response error: {0}")]
    Api(#[from] ApiError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while parsing fiscal journal text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// The journal lacks expected sections or lines.
    #[error("journal structure mismatch: {0}")]
    StructuralMismatch(String),

    /// A table or key-value row has the wrong number of fields.
    #[error("malformed row in {section}: {line:?}")]
    MalformedRow { section: &'static str, line: String },

    /// An item descriptor matches none of the known line layouts.
    #[error("unrecognized item line: {0:?}")]
    UnrecognizedItemLine(String),

    /// An item references a tax identifier missing from the tax table.
    #[error("unknown tax identifier {identifier:?} in item line {line:?}")]
    UnknownTaxIdentifier { identifier: String, line: String },

    /// An item line pattern could not be compiled.
    #[error("invalid item pattern: {0}")]
    Pattern(String),
}

/// Errors raised while decoding a verification URL payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The URL is malformed, from a foreign host, or carries no decodable payload.
    #[error("invalid verification URL: {0}")]
    InvalidUrl(String),

    /// Decoded payload length is outside the valid range.
    #[error("payload length {length} is out of bounds ({min}..={max})")]
    PayloadOutOfBounds { length: usize, min: usize, max: usize },

    /// Trailing checksum does not match the payload.
    #[error("payload checksum mismatch: expected {expected}, computed {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Invoice/transaction type pair has no receipt type.
    #[error("unknown receipt type: invoice type {invoice_type}, transaction type {transaction_type}")]
    UnknownReceiptType { invoice_type: u8, transaction_type: u8 },

    /// Timestamp cannot be represented as a date.
    #[error("invalid payload timestamp: {0}")]
    InvalidTimestamp(u64),
}

/// Errors raised while mapping a fiscal API response.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required top-level keys are absent.
    #[error("missing API fields: {}", .0.join(", "))]
    MissingApiFields(Vec<&'static str>),

    /// A field is present but has an unusable value.
    #[error("invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// The response does not match the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The embedded journal could not be parsed.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// The invoice/transaction type pair is unknown.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Result type for the fiskal library.
pub type Result<T> = std::result::Result<T, FiskalError>;
