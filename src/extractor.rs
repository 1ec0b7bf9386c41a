//! Direct (non-browser) extraction of post titles and bodies.

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::parsers::{PostSelectors, post};
use crate::results::ExtractedRecord;
use crate::utils::pick_user_agent;
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client used for post requests
pub fn build_http_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true);

    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }

    builder.build().map_err(HarvestError::Client)
}

/// Fetches posts over plain HTTP and pulls out their title and body
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: Client,
    selectors: PostSelectors,
}

impl ContentExtractor {
    pub fn new(client: Client, selectors: PostSelectors) -> Self {
        Self { client, selectors }
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        let client = build_http_client(
            config.request_timeout(),
            pick_user_agent(&config.user_agents),
        )?;
        let selectors = PostSelectors::from_config(&config.selectors)?;

        Ok(Self::new(client, selectors))
    }

    /// Extracts one post.
    ///
    /// Only transport problems are errors; a page without the expected
    /// title or body yields a record with that field absent.
    pub async fn extract(&self, url: &str) -> Result<ExtractedRecord> {
        let transport = |source| HarvestError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        let html = String::from_utf8_lossy(&body);

        let record = post::parse(&html, url, &self.selectors);
        if record.title.is_none() || record.content.is_none() {
            ::log::debug!(
                "Incomplete post structure on {} (title: {}, content: {})",
                url,
                record.title.is_some(),
                record.content.is_some()
            );
        }

        Ok(record)
    }
}
