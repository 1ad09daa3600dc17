//! Verification URL payload decoding.

mod decoder;
pub mod layout;

pub use decoder::{decode_url, UrlDecoder};

use crate::error::PayloadError;

/// Result type for payload decoding operations.
pub type Result<T> = std::result::Result<T, PayloadError>;
