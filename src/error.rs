use thiserror::Error;

/// Errors raised while harvesting posts
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to start browser session at {webdriver_url}: {message}")]
    SessionStart {
        webdriver_url: String,
        message: String,
    },

    #[error("browser command failed for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid CSS selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("invalid URL pattern: {0}")]
    Filter(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
