//! Verification URL decoder.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use md5::{Digest, Md5};
use tracing::{debug, warn};
use url::Url;

use super::layout::{self, to_hex, FieldSpec};
use super::Result;
use crate::error::PayloadError;
use crate::models::config::UrlConfig;
use crate::models::payload::UrlPayload;

/// Name of the query parameter carrying the payload.
const PAYLOAD_PARAMETER: &str = "vl";

/// Base64 engine that accepts missing padding and stray trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decoder for the payload of a receipt verification URL.
#[derive(Debug, Clone)]
pub struct UrlDecoder {
    /// Only URLs on this host are accepted.
    allowed_host: String,
    /// Whether a checksum mismatch is an error.
    verify_hash: bool,
}

impl UrlDecoder {
    /// Create a decoder for the tax authority's verification host.
    pub fn new() -> Self {
        Self {
            allowed_host: "suf.purs.gov.rs".to_string(),
            verify_hash: true,
        }
    }

    /// Create a decoder from configuration.
    pub fn from_config(config: &UrlConfig) -> Self {
        Self::new()
            .with_allowed_host(config.allowed_host.clone())
            .with_hash_verification(config.verify_hash)
    }

    /// Set the accepted host.
    pub fn with_allowed_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_host = host.into();
        self
    }

    /// Set whether a checksum mismatch fails decoding.
    pub fn with_hash_verification(mut self, verify: bool) -> Self {
        self.verify_hash = verify;
        self
    }

    /// Decode a verification URL.
    pub fn decode(&self, url: &str) -> Result<UrlPayload> {
        let bytes = self.payload_bytes(url)?;
        self.decode_bytes(&bytes)
    }

    /// Extract and base64-decode the `vl` parameter of a verification URL.
    pub fn payload_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| PayloadError::InvalidUrl(format!("{}: {}", url, e)))?;

        let host = parsed.host_str().unwrap_or_default();
        if !host.eq_ignore_ascii_case(&self.allowed_host) {
            return Err(PayloadError::InvalidUrl(format!(
                "unexpected host {:?}, expected {:?}",
                host, self.allowed_host
            )));
        }

        let value = parsed
            .query_pairs()
            .find(|(name, _)| name == PAYLOAD_PARAMETER)
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| PayloadError::InvalidUrl(format!("no {} parameter in {}", PAYLOAD_PARAMETER, url)))?;

        // Query decoding turns unescaped '+' into spaces.
        let mut encoded: String = value
            .chars()
            .map(|c| if c == ' ' { '+' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
            .collect();

        if encoded.len() % 4 == 1 {
            encoded.pop();
        }

        LENIENT
            .decode(encoded.as_bytes())
            .map_err(|e| PayloadError::InvalidUrl(format!("payload is not base64: {}", e)))
    }

    /// Decode raw payload bytes.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<UrlPayload> {
        let length = bytes.len();
        if !(layout::MIN_PAYLOAD_LENGTH..=layout::MAX_PAYLOAD_LENGTH).contains(&length) {
            return Err(PayloadError::PayloadOutOfBounds {
                length,
                min: layout::MIN_PAYLOAD_LENGTH,
                max: layout::MAX_PAYLOAD_LENGTH,
            });
        }

        let (data, hash) = bytes.split_at(length - layout::HASH_LENGTH);
        let expected = to_hex(hash);
        let actual = to_hex(&Md5::digest(data));

        if expected != actual {
            if self.verify_hash {
                return Err(PayloadError::HashMismatch { expected, actual });
            }
            warn!("Payload checksum mismatch: expected {}, computed {}", expected, actual);
        } else {
            debug!("Payload checksum verified ({} bytes)", length);
        }

        let uint = |field: FieldSpec| field.read_uint(bytes);

        let buyer_id_length = uint(layout::BUYER_ID_LENGTH) as u8;
        let variable = layout::variable_layout(length, usize::from(buyer_id_length));

        Ok(UrlPayload {
            version: uint(layout::VERSION) as u8,
            requested_by: layout::REQUESTED_BY.read_text(bytes),
            signed_by: layout::SIGNED_BY.read_text(bytes),
            total_counter: uint(layout::TOTAL_COUNTER) as u32,
            transaction_type_counter: uint(layout::TRANSACTION_TYPE_COUNTER) as u32,
            total_amount: uint(layout::TOTAL_AMOUNT),
            date_and_time: uint(layout::DATE_AND_TIME),
            invoice_type: uint(layout::INVOICE_TYPE) as u8,
            transaction_type: uint(layout::TRANSACTION_TYPE) as u8,
            buyer_id_length,
            buyer_id: (buyer_id_length > 0).then(|| variable.buyer_id.read_text(bytes)),
            encrypted_internal_data: variable.encrypted_internal_data.read_hex(bytes),
            signature: variable.signature.read_hex(bytes),
            hash: expected,
        })
    }
}

impl Default for UrlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a verification URL with the default decoder.
pub fn decode_url(url: &str) -> Result<UrlPayload> {
    UrlDecoder::new().decode(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_foreign_host() {
        assert!(matches!(
            decode_url("https://www.google.com"),
            Err(PayloadError::InvalidUrl(_))
        ));
        assert!(matches!(
            decode_url("random string"),
            Err(PayloadError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_missing_payload_parameter() {
        assert!(matches!(
            decode_url("https://suf.purs.gov.rs/v/?foo=bar"),
            Err(PayloadError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_custom_host() {
        let decoder = UrlDecoder::new().with_allowed_host("example.test");

        assert_eq!(decoder.payload_bytes("https://example.test/v/?vl=AQID").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_spaces_are_restored_to_plus() {
        let decoder = UrlDecoder::new();
        let bytes = decoder.payload_bytes("https://suf.purs.gov.rs/v/?vl=+/8=").unwrap();

        assert_eq!(bytes, vec![0xfb, 0xff]);
    }

    #[test]
    fn test_payload_out_of_bounds() {
        let decoder = UrlDecoder::new();

        assert_eq!(
            decoder.decode_bytes(&[0u8; 571]),
            Err(PayloadError::PayloadOutOfBounds { length: 571, min: 572, max: 848 })
        );
        assert_eq!(
            decoder.decode_bytes(&[0u8; 849]),
            Err(PayloadError::PayloadOutOfBounds { length: 849, min: 572, max: 848 })
        );
    }
}
