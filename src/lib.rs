//! Discovers blog posts by walking paginated listings in a headless browser,
//! then extracts each post's title and body over plain HTTP.

pub mod batch;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod output;
pub mod parsers;
pub mod results;
pub mod seeds;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use results::{DiscoveryReport, ExtractedRecord, ExtractionReport, SeedSite};

use crawlers::{PaginationWalker, SessionFactory, WalkOptions, WebDriverSessionFactory};
use extractor::ContentExtractor;
use filter::UrlFilter;
use parsers::ListingSelectors;

/// Main builder for a harvest run
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Load the configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(HarvestConfig::from_file(path)?))
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    pub fn with_browser(mut self, browser: config::Browser) -> Self {
        self.config.browser = browser;
        self
    }

    /// Set how long each listing page may take to render
    pub fn with_page_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.page_timeout_secs = timeout_seconds;
        self
    }

    /// Cap the number of listing pages walked per seed
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the maximum number of concurrent post extractions
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the maximum number of seeds walked concurrently
    pub fn with_seed_concurrency(mut self, seed_concurrency: usize) -> Self {
        self.config.seed_concurrency = seed_concurrency;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.config.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Build a pagination walker on top of any session factory
    pub fn walker<F: SessionFactory>(&self, factory: F) -> Result<PaginationWalker<F>> {
        Ok(PaginationWalker::new(
            factory,
            WalkOptions::from_config(&self.config),
            ListingSelectors::from_config(&self.config.selectors)?,
            UrlFilter::new(self.config.filter.clone())?,
        ))
    }

    pub fn extractor(&self) -> Result<ContentExtractor> {
        ContentExtractor::from_config(&self.config)
    }

    /// Walk every seed in a WebDriver-backed browser
    pub async fn discover(&self, seeds: &[SeedSite]) -> Result<DiscoveryReport> {
        self.discover_with(WebDriverSessionFactory::from_config(&self.config), seeds)
            .await
    }

    /// Walk every seed using the given session factory
    pub async fn discover_with<F: SessionFactory>(
        &self,
        factory: F,
        seeds: &[SeedSite],
    ) -> Result<DiscoveryReport> {
        let walker = self.walker(factory)?;
        Ok(batch::extract_urls(
            &walker,
            seeds,
            self.config.seed_concurrency,
            self.config.show_progress,
        )
        .await)
    }

    /// Extract the title and body of every URL, in order
    pub async fn extract(&self, urls: &[String]) -> Result<ExtractionReport> {
        let extractor = self.extractor()?;
        Ok(batch::extract_data(
            &extractor,
            urls,
            self.config.max_concurrency,
            self.config.show_progress,
        )
        .await)
    }
}
