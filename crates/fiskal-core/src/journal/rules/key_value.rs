//! `Label: value` pairs with wrapped values.

use tracing::trace;

use super::patterns::LABEL_SEPARATOR;
use super::SectionExtractor;
use crate::journal::Result;

/// Ordered label/value pairs. Writing an existing label replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValuePairs {
    pairs: Vec<(String, String)>,
}

impl KeyValuePairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a label, returning its position.
    pub fn insert(&mut self, label: String, value: String) -> usize {
        match self.pairs.iter().position(|(existing, _)| *existing == label) {
            Some(index) => {
                self.pairs[index].1 = value;
                index
            }
            None => {
                self.pairs.push((label, value));
                self.pairs.len() - 1
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(label, value)| (label.as_str(), value.as_str()))
    }

    fn append(&mut self, index: usize, continuation: &str) {
        if let Some((_, value)) = self.pairs.get_mut(index) {
            value.push_str(continuation);
        }
    }
}

impl IntoIterator for KeyValuePairs {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Scanner state while reading pairs.
#[derive(Debug, Clone, Copy)]
enum State {
    /// No label seen yet; unlabeled lines are dropped.
    NoPendingKey,
    /// Unlabeled lines continue the value at this position.
    PendingKey(usize),
}

/// Splits lines on the first `": "` into label and value.
///
/// A line without the separator continues the value of the previous label.
/// Continuations are trimmed and appended without a separator, since the
/// printer wraps long values such as receipt numbers mid-token.
#[derive(Debug, Clone, Default)]
pub struct KeyValueExtractor;

impl KeyValueExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract pairs from a block of lines. Never fails.
    pub fn pairs(&self, text: &str) -> KeyValuePairs {
        let mut pairs = KeyValuePairs::new();
        let mut state = State::NoPendingKey;

        for line in text.lines() {
            state = match (line.split_once(LABEL_SEPARATOR), state) {
                (Some((label, value)), _) => {
                    State::PendingKey(pairs.insert(label.trim().to_string(), value.trim().to_string()))
                }
                (None, State::PendingKey(index)) => {
                    pairs.append(index, line.trim());
                    State::PendingKey(index)
                }
                (None, State::NoPendingKey) => {
                    trace!("Dropping unlabeled line: {:?}", line);
                    State::NoPendingKey
                }
            };
        }

        pairs
    }
}

impl SectionExtractor for KeyValueExtractor {
    type Output = KeyValuePairs;

    fn extract(&self, text: &str) -> Result<Self::Output> {
        Ok(self.pairs(text))
    }
}

/// Extract label/value pairs from text.
pub fn extract_pairs(text: &str) -> KeyValuePairs {
    KeyValueExtractor::new().pairs(text)
}
