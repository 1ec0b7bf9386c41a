use crate::error::Result;
use crate::results::FetchedPage;
use async_trait::async_trait;
use std::time::Duration;

/// Loads listing pages in a rendering session
#[async_trait]
pub trait PageFetcher: Send {
    /// Load `url` and wait up to `timeout` for it to render.
    ///
    /// A render that never completes is not an error: the current DOM is
    /// returned with `timed_out` set.
    async fn fetch(&mut self, url: &str, timeout: Duration) -> Result<FetchedPage>;

    /// End the session
    async fn close(self) -> Result<()>;
}

/// Opens a fresh fetcher for each seed walk
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Fetcher: PageFetcher;

    async fn open(&self) -> Result<Self::Fetcher>;
}
