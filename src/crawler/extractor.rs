//! HTML item extraction
//!
//! This module turns fetched page content into text items. The crawl core only
//! sees the `ItemExtractor` trait; the markup specifics live in
//! `SelectorExtractor`.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Per-page extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Malformed page content: {0}")]
    Malformed(String),
}

/// Turns raw page content into an ordered sequence of text items
///
/// Extraction is synchronous CPU work over already-fetched content. Returned items
/// may be empty strings; the crawler discards those.
pub trait ItemExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<Vec<String>, ExtractError>;
}

/// Extracts one item per listing row using CSS selectors
///
/// For every element matching `row_selector`, the text of all descendants matching
/// `item_selector` is concatenated and trimmed.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    row_selector: Selector,
    item_selector: Selector,
}

impl SelectorExtractor {
    /// Creates an extractor from selector strings
    ///
    /// # Arguments
    ///
    /// * `row_selector` - Selector for one listing row (e.g. `.views-row`)
    /// * `item_selector` - Selector, relative to a row, for the item text
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorExtractor)` - Both selectors parsed
    /// * `Err(ExtractError::InvalidSelector)` - One of the selectors is invalid
    ///
    /// # Example
    ///
    /// ```
    /// use page_harvest::crawler::{ItemExtractor, SelectorExtractor};
    ///
    /// let extractor = SelectorExtractor::new(".views-row", ".createYourOwn").unwrap();
    /// let html = r#"<div class="views-row"><span class="createYourOwn"> Fact </span></div>"#;
    /// assert_eq!(extractor.extract(html).unwrap(), vec!["Fact".to_string()]);
    /// ```
    pub fn new(row_selector: &str, item_selector: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            row_selector: parse_selector(row_selector)?,
            item_selector: parse_selector(item_selector)?,
        })
    }

    fn row_text(&self, row: ElementRef<'_>) -> String {
        row.select(&self.item_selector)
            .flat_map(|element| element.text())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

impl ItemExtractor for SelectorExtractor {
    fn extract(&self, content: &str) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(content);

        Ok(document
            .select(&self.row_selector)
            .map(|row| self.row_text(row))
            .collect())
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
