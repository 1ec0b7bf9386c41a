use crate::crawlers::fetcher::{PageFetcher, SessionFactory};
use crate::error::{HarvestError, Result};
use crate::results::FetchedPage;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
struct StubPage {
    html: String,
    timed_out: bool,
}

/// What the stub sessions have been asked to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubLog {
    /// Every fetched URL, in request order
    pub fetched: Vec<String>,
    pub opened: usize,
    pub closed: usize,
}

/// Session factory serving canned HTML instead of driving a browser.
///
/// URLs without a canned page behave like a page that never renders: an
/// empty document flagged as timed out.
#[derive(Debug, Clone, Default)]
pub struct StubSessionFactory {
    pages: HashMap<String, StubPage>,
    failing: HashSet<String>,
    refuse_sessions: bool,
    log: Arc<Mutex<StubLog>>,
}

impl StubSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            StubPage {
                html: html.into(),
                timed_out: false,
            },
        );
        self
    }

    /// Serve `html` for `url`, but report that the load marker never appeared
    pub fn with_stalled_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            StubPage {
                html: html.into(),
                timed_out: true,
            },
        );
        self
    }

    /// Make fetching `url` fail as if the session had crashed
    pub fn with_failing_page(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Make every attempt to open a session fail
    pub fn refusing_sessions(mut self) -> Self {
        self.refuse_sessions = true;
        self
    }

    /// Snapshot of the activity so far
    pub fn log(&self) -> StubLog {
        lock(&self.log).clone()
    }
}

fn lock(log: &Mutex<StubLog>) -> MutexGuard<'_, StubLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SessionFactory for StubSessionFactory {
    type Fetcher = StubFetcher;

    async fn open(&self) -> Result<StubFetcher> {
        if self.refuse_sessions {
            return Err(HarvestError::SessionStart {
                webdriver_url: "stub://".to_string(),
                message: "session refused".to_string(),
            });
        }

        lock(&self.log).opened += 1;
        Ok(StubFetcher {
            pages: self.pages.clone(),
            failing: self.failing.clone(),
            log: Arc::clone(&self.log),
        })
    }
}

/// Session handed out by [`StubSessionFactory`]
#[derive(Debug)]
pub struct StubFetcher {
    pages: HashMap<String, StubPage>,
    failing: HashSet<String>,
    log: Arc<Mutex<StubLog>>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&mut self, url: &str, _timeout: Duration) -> Result<FetchedPage> {
        lock(&self.log).fetched.push(url.to_string());

        if self.failing.contains(url) {
            return Err(HarvestError::Browser {
                url: url.to_string(),
                message: "session crashed".to_string(),
            });
        }

        let page = self.pages.get(url).cloned().unwrap_or(StubPage {
            html: String::new(),
            timed_out: true,
        });

        Ok(FetchedPage {
            url: url.to_string(),
            html: page.html,
            timed_out: page.timed_out,
        })
    }

    async fn close(self) -> Result<()> {
        lock(&self.log).closed += 1;
        Ok(())
    }
}
