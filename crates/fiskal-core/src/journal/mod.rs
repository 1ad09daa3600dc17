//! Fiscal journal parsing module.

mod parser;
pub mod rules;
pub mod sections;

pub use parser::{JournalParser, ReceiptParser};
pub use rules::SectionExtractor;
pub use sections::{split_journal, JournalSections};

use crate::error::JournalError;

/// Result type for journal parsing operations.
pub type Result<T> = std::result::Result<T, JournalError>;
