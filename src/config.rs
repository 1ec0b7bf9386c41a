use crate::error::Result;
use crate::filter::UrlFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Browser driven through WebDriver for listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Firefox,
    Chrome,
}

/// CSS selectors describing the blog's markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// "Read more" links on a listing page
    #[serde(default = "default_more_link")]
    pub more_link: String,

    /// Link to the next listing page
    #[serde(default = "default_next_page")]
    pub next_page: String,

    /// Element whose presence means the listing has rendered
    #[serde(default = "default_load_marker")]
    pub load_marker: String,

    /// Post title
    #[serde(default = "default_title")]
    pub title: String,

    /// Post body
    #[serde(default = "default_content")]
    pub content: String,

    /// Feedback widget removed from the post body
    #[serde(default = "default_feedback")]
    pub feedback: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            more_link: default_more_link(),
            next_page: default_next_page(),
            load_marker: default_load_marker(),
            title: default_title(),
            content: default_content(),
            feedback: default_feedback(),
        }
    }
}

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default)]
    pub browser: Browser,

    /// Seconds to wait for each listing page to render
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Maximum listing pages per seed (unbounded when absent)
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Appended to the seed URL for pages after the first; `{page}` is the page number
    #[serde(default = "default_page_suffix")]
    pub page_suffix: String,

    /// Seconds allowed for each direct post request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of posts extracted concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of seed sites walked concurrently
    #[serde(default = "default_seed_concurrency")]
    pub seed_concurrency: usize,

    /// Pool of user agents; one is picked at random per session
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Filter applied to discovered post links
    #[serde(default)]
    pub filter: UrlFilterConfig,

    /// Draw progress bars on the console
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            browser: Browser::default(),
            page_timeout_secs: default_page_timeout_secs(),
            max_pages: None,
            page_suffix: default_page_suffix(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            seed_concurrency: default_seed_concurrency(),
            user_agents: default_user_agents(),
            selectors: SelectorConfig::default(),
            filter: UrlFilterConfig::default(),
            show_progress: default_show_progress(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_page_timeout_secs() -> u64 {
    30
}

fn default_page_suffix() -> String {
    "/page/{page}/?et_blog".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    4
}

fn default_seed_concurrency() -> usize {
    1
}

fn default_show_progress() -> bool {
    true
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.5; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|ua| ua.to_string())
    .collect()
}

fn default_more_link() -> String {
    "a.more-link".to_string()
}

fn default_next_page() -> String {
    "a.nextpostslink".to_string()
}

fn default_load_marker() -> String {
    ".more-link".to_string()
}

fn default_title() -> String {
    "h1.entry-title".to_string()
}

fn default_content() -> String {
    "div.et_pb_post_content".to_string()
}

fn default_feedback() -> String {
    "div.daexthefu-container".to_string()
}
