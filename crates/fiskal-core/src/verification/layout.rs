//! Byte layout of the verification payload.
//!
//! | offset | width | field                          |
//! |--------|-------|--------------------------------|
//! | 0      | 1     | version                        |
//! | 1      | 8     | requested by                   |
//! | 9      | 8     | signed by                      |
//! | 17     | 4     | total counter (LE)             |
//! | 21     | 4     | transaction type counter (LE)  |
//! | 25     | 8     | total amount (LE)              |
//! | 33     | 8     | date and time, ms (BE)         |
//! | 41     | 1     | invoice type                   |
//! | 42     | 1     | transaction type               |
//! | 43     | 1     | buyer id length                |
//! | 44     | n     | buyer id                       |
//! | 44+n   | 256/512 | encrypted internal data      |
//! | ...    | 256   | signature                      |
//! | len-16 | 16    | MD5 of all preceding bytes     |

use std::ops::Range;

/// Shortest valid payload.
pub const MIN_PAYLOAD_LENGTH: usize = 572;

/// Longest valid payload.
pub const MAX_PAYLOAD_LENGTH: usize = 848;

/// Payloads longer than this carry the long encrypted block.
pub const SHORT_PAYLOAD_LENGTH: usize = 592;

pub const HASH_LENGTH: usize = 16;

pub const SIGNATURE_LENGTH: usize = 256;

/// How a field's bytes are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
    Byte,
    Ascii,
    U32Le,
    U64Le,
    U64Be,
    Raw,
}

/// A field at a fixed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub decode: Decode,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, width: usize, decode: Decode) -> Self {
        Self { name, offset, width, decode }
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width
    }

    /// The field's bytes; short when the payload is truncated.
    pub fn bytes<'a>(&self, payload: &'a [u8]) -> &'a [u8] {
        let end = (self.offset + self.width).min(payload.len());
        payload.get(self.offset.min(end)..end).unwrap_or_default()
    }

    /// Read the field as an unsigned integer.
    pub fn read_uint(&self, payload: &[u8]) -> u64 {
        let bytes = self.bytes(payload);
        match self.decode {
            Decode::Byte | Decode::U32Le | Decode::U64Le => bytes
                .iter()
                .rev()
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)),
            Decode::U64Be => bytes
                .iter()
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)),
            Decode::Ascii | Decode::Raw => 0,
        }
    }

    /// Read the field as text, dropping NUL padding.
    pub fn read_text(&self, payload: &[u8]) -> String {
        String::from_utf8_lossy(self.bytes(payload))
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string()
    }

    /// Read the field as lowercase hex.
    pub fn read_hex(&self, payload: &[u8]) -> String {
        to_hex(self.bytes(payload))
    }
}

/// Lowercase hex encoding.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

pub const VERSION: FieldSpec = FieldSpec::new("version", 0, 1, Decode::Byte);
pub const REQUESTED_BY: FieldSpec = FieldSpec::new("requested_by", 1, 8, Decode::Ascii);
pub const SIGNED_BY: FieldSpec = FieldSpec::new("signed_by", 9, 8, Decode::Ascii);
pub const TOTAL_COUNTER: FieldSpec = FieldSpec::new("total_counter", 17, 4, Decode::U32Le);
pub const TRANSACTION_TYPE_COUNTER: FieldSpec =
    FieldSpec::new("transaction_type_counter", 21, 4, Decode::U32Le);
pub const TOTAL_AMOUNT: FieldSpec = FieldSpec::new("total_amount", 25, 8, Decode::U64Le);
pub const DATE_AND_TIME: FieldSpec = FieldSpec::new("date_and_time", 33, 8, Decode::U64Be);
pub const INVOICE_TYPE: FieldSpec = FieldSpec::new("invoice_type", 41, 1, Decode::Byte);
pub const TRANSACTION_TYPE: FieldSpec = FieldSpec::new("transaction_type", 42, 1, Decode::Byte);
pub const BUYER_ID_LENGTH: FieldSpec = FieldSpec::new("buyer_id_length", 43, 1, Decode::Byte);

/// Fields at the same position in every payload.
pub const FIXED_FIELDS: [FieldSpec; 10] = [
    VERSION,
    REQUESTED_BY,
    SIGNED_BY,
    TOTAL_COUNTER,
    TRANSACTION_TYPE_COUNTER,
    TOTAL_AMOUNT,
    DATE_AND_TIME,
    INVOICE_TYPE,
    TRANSACTION_TYPE,
    BUYER_ID_LENGTH,
];

/// Offset of the buyer id, the first variable field.
pub const VARIABLE_OFFSET: usize = 44;

/// Positions of the fields that depend on payload and buyer id length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    pub buyer_id: FieldSpec,
    pub encrypted_internal_data: FieldSpec,
    pub signature: FieldSpec,
    pub hash: FieldSpec,
}

/// Lay out the variable fields for a payload of `length` bytes.
pub fn variable_layout(length: usize, buyer_id_length: usize) -> VariableLayout {
    let encrypted_length = if length > SHORT_PAYLOAD_LENGTH { 512 } else { 256 };

    let buyer_id = FieldSpec::new("buyer_id", VARIABLE_OFFSET, buyer_id_length, Decode::Ascii);
    let encrypted_internal_data = FieldSpec::new(
        "encrypted_internal_data",
        buyer_id.offset + buyer_id.width,
        encrypted_length,
        Decode::Raw,
    );
    let signature = FieldSpec::new(
        "signature",
        encrypted_internal_data.offset + encrypted_internal_data.width,
        SIGNATURE_LENGTH,
        Decode::Raw,
    );
    let hash = FieldSpec::new(
        "hash",
        length.saturating_sub(HASH_LENGTH),
        HASH_LENGTH,
        Decode::Raw,
    );

    VariableLayout {
        buyer_id,
        encrypted_internal_data,
        signature,
        hash,
    }
}
