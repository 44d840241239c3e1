//! Page count discovery
//!
//! Before any crawling starts, the reference page is fetched and its "last page"
//! pager link is read to bound the work set.

use crate::config::SiteConfig;
use crate::crawler::extractor::parse_selector;
use crate::crawler::PageFetcher;
use crate::DiscoveryError;
use scraper::{Html, Selector};
use url::Url;

/// Finds the total number of pages of a paginated listing
pub struct PageCountDiscoverer {
    marker_selector: Selector,
    selector_source: String,
    page_parameter: String,
}

impl PageCountDiscoverer {
    /// Creates a discoverer
    ///
    /// # Arguments
    ///
    /// * `marker_selector` - CSS selector of the last-page link (e.g. `.pager-last a`)
    /// * `page_parameter` - Query parameter of that link carrying the page number
    pub fn new(marker_selector: &str, page_parameter: &str) -> Result<Self, DiscoveryError> {
        let selector = parse_selector(marker_selector)?;

        Ok(Self {
            marker_selector: selector,
            selector_source: marker_selector.to_string(),
            page_parameter: page_parameter.to_string(),
        })
    }

    pub fn from_site(site: &SiteConfig) -> Result<Self, DiscoveryError> {
        Self::new(&site.last_page_selector, &site.page_parameter)
    }

    /// Fetches the reference page and returns the page count
    ///
    /// No retries: any failure here is fatal to the run.
    pub async fn discover(
        &self,
        fetcher: &dyn PageFetcher,
        reference_url: &str,
    ) -> Result<u32, DiscoveryError> {
        tracing::debug!("Fetching reference page: {}", reference_url);
        let content = fetcher.fetch(reference_url).await?;

        let pages = self.parse_page_count(&content, reference_url)?;
        tracing::info!("Discovered {} pages", pages);
        Ok(pages)
    }

    /// Reads the page count from reference page content
    ///
    /// The marker's `href` is resolved against `base_url` and its page parameter is
    /// used; when the link carries no such parameter the marker text is tried.
    pub fn parse_page_count(&self, content: &str, base_url: &str) -> Result<u32, DiscoveryError> {
        let raw = {
            let document = Html::parse_document(content);
            let marker = document.select(&self.marker_selector).next().ok_or_else(|| {
                DiscoveryError::MarkerNotFound {
                    url: base_url.to_string(),
                    selector: self.selector_source.clone(),
                }
            })?;

            let from_href = marker
                .value()
                .attr("href")
                .and_then(|href| self.page_from_href(href, base_url));

            match from_href {
                Some(value) => value,
                None => {
                    let text = marker.text().collect::<String>().trim().to_string();
                    if text.is_empty() {
                        return Err(DiscoveryError::MissingValue(format!(
                            "'{}' has neither a '{}' parameter nor text",
                            self.selector_source, self.page_parameter
                        )));
                    }
                    text
                }
            }
        };

        parse_positive(&raw)
    }

    fn page_from_href(&self, href: &str, base_url: &str) -> Option<String> {
        let base = Url::parse(base_url).ok()?;
        let resolved = base.join(href.trim()).ok()?;

        resolved
            .query_pairs()
            .find(|(key, _)| key == self.page_parameter.as_str())
            .map(|(_, value)| value.trim().to_string())
    }
}

fn parse_positive(raw: &str) -> Result<u32, DiscoveryError> {
    match raw.parse::<u32>() {
        Ok(pages) if pages > 0 => Ok(pages),
        _ => Err(DiscoveryError::InvalidPageCount(raw.to_string())),
    }
}
