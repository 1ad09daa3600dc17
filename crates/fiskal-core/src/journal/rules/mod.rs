//! Rule-based extractors for the sections of a fiscal journal.

pub mod items;
pub mod key_value;
pub mod patterns;
pub mod store;
pub mod taxes;

pub use items::{DescriptorMatch, DescriptorVariant, ItemLineExtractor};
pub use key_value::{KeyValueExtractor, KeyValuePairs};
pub use store::StoreExtractor;
pub use taxes::{TaxTable, TaxTableExtractor};

use super::Result;

/// Trait for journal section extractors.
pub trait SectionExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the value from the text of one section.
    fn extract(&self, text: &str) -> Result<Self::Output>;
}
