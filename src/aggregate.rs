//! Aggregation of crawled items
//!
//! Turns the unordered result set into the final sorted, duplicate-free
//! collection. Items are compared byte-wise with no normalization.

use crate::output::CollectionDocument;
use std::collections::BTreeSet;

/// Sorted, duplicate-free items ready to be persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalCollection {
    items: Vec<String>,
}

impl FinalCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }

    /// Wraps the collection in the single-field document handed to sinks
    pub fn into_document(self, field: &str) -> CollectionDocument {
        CollectionDocument::new(field, self.items)
    }
}

/// Sorts and deduplicates raw items
///
/// The output depends only on the multiset of inputs, never on their order.
///
/// # Example
///
/// ```
/// use page_harvest::aggregate;
///
/// let items = vec!["b".to_string(), "a".to_string(), "a".to_string(), "c".to_string()];
/// assert_eq!(aggregate(items).as_slice(), ["a", "b", "c"]);
/// ```
pub fn aggregate(items: Vec<String>) -> FinalCollection {
    let unique: BTreeSet<String> = items.into_iter().collect();
    FinalCollection {
        items: unique.into_iter().collect(),
    }
}
