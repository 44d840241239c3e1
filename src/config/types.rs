use serde::Deserialize;
use std::fmt;

/// Placeholder replaced by the page number in [`PageUrlTemplate`]
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Main configuration structure for Page-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of page fetches in flight at once
    #[serde(rename = "concurrency-limit", default = "default_concurrency_limit")]
    pub concurrency_limit: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_concurrency_limit() -> u32 {
    20
}

fn default_request_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PageHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Target site description: where to discover the page count and how to
/// address and read each page
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Page fetched to discover the total page count
    #[serde(rename = "reference-url")]
    pub reference_url: String,

    /// URL of an individual page, with `{page}` standing for the page number
    #[serde(rename = "page-url-template")]
    pub page_url_template: PageUrlTemplate,

    /// CSS selector for the link to the last page
    #[serde(rename = "last-page-selector", default = "default_last_page_selector")]
    pub last_page_selector: String,

    /// Query parameter of the last-page link that carries the page number
    #[serde(rename = "page-parameter", default = "default_page_parameter")]
    pub page_parameter: String,

    /// CSS selector for one listing row
    #[serde(rename = "row-selector", default = "default_row_selector")]
    pub row_selector: String,

    /// CSS selector, relative to a row, for the element holding the item text
    #[serde(rename = "item-selector", default = "default_item_selector")]
    pub item_selector: String,
}

fn default_last_page_selector() -> String {
    ".pager-last a".to_string()
}

fn default_page_parameter() -> String {
    "page".to_string()
}

fn default_row_selector() -> String {
    ".views-row".to_string()
}

fn default_item_selector() -> String {
    ".createYourOwn".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Where the final collection is written (file path for both formats)
    pub destination: String,

    /// Storage format of the final collection
    #[serde(default)]
    pub format: OutputFormat,

    /// Name of the single field holding the collection
    #[serde(rename = "collection-field", default = "default_collection_field")]
    pub collection_field: String,

    /// Optional path of a markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

fn default_collection_field() -> String {
    "quotes".to_string()
}

/// Supported result sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Sqlite,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Page URL pattern with a `{page}` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PageUrlTemplate(String);

impl PageUrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Builds the URL of the given page
    pub fn url_for(&self, page: u32) -> String {
        self.0.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    pub fn has_placeholder(&self) -> bool {
        self.0.contains(PAGE_PLACEHOLDER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_replaces_placeholder() {
        let template = PageUrlTemplate::new("https://example.com/list?page={page}");
        assert_eq!(template.url_for(7), "https://example.com/list?page=7");
        assert!(template.has_placeholder());
    }

    #[test]
    fn test_template_without_placeholder() {
        let template = PageUrlTemplate::new("https://example.com/list");
        assert!(!template.has_placeholder());
        assert_eq!(template.url_for(3), "https://example.com/list");
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "Bot".to_string(),
            crawler_version: "2.1".to_string(),
            contact_url: Some("https://example.com/bot".to_string()),
        };
        assert_eq!(ua.header_value(), "Bot/2.1 (+https://example.com/bot)");

        let bare = UserAgentConfig {
            contact_url: None,
            ..ua
        };
        assert_eq!(bare.header_value(), "Bot/2.1");
    }
}
