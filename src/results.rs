use serde::{Deserialize, Serialize};

/// A base listing URL to be paginated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSite {
    pub url: String,
}

impl SeedSite {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Rendered HTML of one listing page as returned by a page fetcher
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,

    /// DOM snapshot, possibly partial when `timed_out` is set
    pub html: String,

    /// The load-completion marker did not appear in time
    pub timed_out: bool,
}

/// Links discovered on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// "Read more" hrefs in document order, as written in the markup
    pub post_links: Vec<String>,

    /// Whether the page links to a following listing page
    pub has_next_page: bool,
}

/// Title and body pulled out of one post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// URL the record was extracted from
    pub url: String,

    pub title: Option<String>,

    pub content: Option<String>,

    /// Transport failure for this URL, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractedRecord {
    /// Create a record for a URL that could not be fetched
    pub fn failed(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            url: url.into(),
            title: None,
            content: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// A seed whose walk could not be completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFailure {
    pub seed: String,
    pub error: String,
}

/// Outcome of walking every seed site
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Deduplicated post URLs, in first-seen order
    pub urls: Vec<String>,

    /// Number of links collected before deduplication
    pub raw_count: usize,

    pub failures: Vec<SeedFailure>,
}

/// Outcome of extracting every discovered post
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// One record per input URL, in input order
    pub records: Vec<ExtractedRecord>,

    /// Number of records carrying a transport error
    pub failed: usize,
}
