use crate::config::{Browser, HarvestConfig};
use crate::crawlers::fetcher::{PageFetcher, SessionFactory};
use crate::error::{HarvestError, Result};
use crate::results::FetchedPage;
use crate::utils::pick_user_agent;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Extra time granted to a navigation beyond the browser's own page-load timeout
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

/// Opens headless, private WebDriver sessions with a randomized user agent
#[derive(Debug, Clone)]
pub struct WebDriverSessionFactory {
    webdriver_url: String,
    browser: Browser,
    user_agents: Vec<String>,
    load_marker: String,
    page_timeout: Duration,
}

impl WebDriverSessionFactory {
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            browser: config.browser,
            user_agents: config.user_agents.clone(),
            load_marker: config.selectors.load_marker.clone(),
            page_timeout: config.page_timeout(),
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverSessionFactory {
    type Fetcher = WebDriverFetcher;

    async fn open(&self) -> Result<WebDriverFetcher> {
        let user_agent = pick_user_agent(&self.user_agents);
        ::log::debug!("Opening {:?} session with user agent {:?}", self.browser, user_agent);

        let capabilities = capabilities(self.browser, user_agent, self.page_timeout);
        let (client, endpoint) = connect_to_webdriver(&self.webdriver_url, &capabilities).await?;

        Ok(WebDriverFetcher {
            client,
            endpoint,
            capabilities,
            load_marker: self.load_marker.clone(),
        })
    }
}

/// Builds the capabilities for a headless, private session
pub fn capabilities(
    browser: Browser,
    user_agent: Option<&str>,
    page_timeout: Duration,
) -> Capabilities {
    let timeouts = json!({ "pageLoad": page_timeout.as_millis() as u64 });

    let value = match browser {
        Browser::Firefox => {
            let mut prefs = serde_json::Map::new();
            if let Some(ua) = user_agent {
                prefs.insert("general.useragent.override".to_string(), json!(ua));
            }
            json!({
                "browserName": "firefox",
                "timeouts": timeouts,
                "moz:firefoxOptions": {
                    "args": ["-headless", "-private"],
                    "prefs": prefs,
                    "log": { "level": "fatal" },
                },
            })
        }
        Browser::Chrome => {
            let mut args = vec![
                "--headless=new".to_string(),
                "--incognito".to_string(),
                "--disable-gpu".to_string(),
            ];
            if let Some(ua) = user_agent {
                args.push(format!("--user-agent={}", ua));
            }
            json!({
                "browserName": "chrome",
                "timeouts": timeouts,
                "goog:chromeOptions": { "args": args },
            })
        }
    };

    match value {
        serde_json::Value::Object(map) => map,
        _ => Capabilities::new(),
    }
}

/// Connects to the WebDriver instance, falling back to well-known local endpoints
async fn connect_to_webdriver(
    webdriver_url: &str,
    capabilities: &Capabilities,
) -> Result<(Client, String)> {
    let first_error = match connect(webdriver_url, capabilities).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok((client, webdriver_url.to_string()));
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    let fallback_urls = [
        "http://localhost:4444", // geckodriver / Selenium default
        "http://localhost:9515", // ChromeDriver default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter().filter(|url| **url != webdriver_url) {
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = connect(url, capabilities).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok((client, url.to_string()));
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(HarvestError::SessionStart {
        webdriver_url: webdriver_url.to_string(),
        message: first_error,
    })
}

async fn connect(
    url: &str,
    capabilities: &Capabilities,
) -> std::result::Result<Client, String> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());
    builder.connect(url).await.map_err(|e| e.to_string())
}

/// One WebDriver session, used for every page of a single seed walk
pub struct WebDriverFetcher {
    client: Client,
    endpoint: String,
    capabilities: Capabilities,
    load_marker: String,
}

impl WebDriverFetcher {
    async fn load(&self, url: &str, wait: Duration) -> Result<FetchedPage> {
        let started = Instant::now();
        let mut timed_out = false;
        let mut navigation_stalled = false;

        match timeout(wait + NAVIGATION_GRACE, self.client.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if is_navigation_timeout(&e) => {
                ::log::warn!("Page load timed out on {}", url);
                timed_out = true;
            }
            Ok(Err(e)) => return Err(navigation_error(e, "accessing", url)),
            Err(_) => {
                ::log::warn!("Navigation to {} did not return within {:?}", url, wait);
                timed_out = true;
                navigation_stalled = true;
            }
        }

        if !timed_out {
            let marker = self
                .client
                .wait()
                .at_most(wait)
                .for_element(Locator::Css(&self.load_marker))
                .await;

            match marker {
                Ok(_) => {}
                Err(CmdError::WaitTimeout) => {
                    ::log::warn!(
                        "Timeout waiting for `{}` on {}; parsing the current page",
                        self.load_marker,
                        url
                    );
                    timed_out = true;
                }
                Err(e) => return Err(navigation_error(e, "waiting for content on", url)),
            }
        }

        // A stalled navigation is still queued ahead of this command in the session
        let limit = source_limit(wait, navigation_stalled);
        let html = match timeout(limit, self.client.source()).await {
            Ok(Ok(source)) => source,
            Ok(Err(e)) => return Err(navigation_error(e, "getting source for", url)),
            Err(_) if navigation_stalled => {
                ::log::warn!("No page source for stalled page {}; treating it as empty", url);
                String::new()
            }
            Err(_) => {
                return Err(HarvestError::Browser {
                    url: url.to_string(),
                    message: "page source was not returned in time".to_string(),
                });
            }
        };

        ::log::debug!(
            "Loaded {} in {:.2} seconds",
            url,
            started.elapsed().as_secs_f64()
        );

        Ok(FetchedPage {
            url: url.to_string(),
            html,
            timed_out,
        })
    }

    /// Replaces a lost session with a new one on the same endpoint
    async fn reconnect(&mut self) -> Result<()> {
        ::log::warn!("Attempting to reconnect WebDriver session");
        match connect(&self.endpoint, &self.capabilities).await {
            Ok(client) => {
                self.client = client;
                ::log::info!("Reconnected to WebDriver at {}", self.endpoint);
                Ok(())
            }
            Err(message) => {
                ::log::error!("Failed to reconnect to WebDriver: {}", message);
                Err(HarvestError::SessionStart {
                    webdriver_url: self.endpoint.clone(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&mut self, url: &str, timeout: Duration) -> Result<FetchedPage> {
        match self.load(url, timeout).await {
            Err(HarvestError::Browser { message, .. }) if is_lost_session(&message) => {
                ::log::warn!("Lost session while loading {}", url);
                self.reconnect().await?;
                self.load(url, timeout).await
            }
            other => other,
        }
    }

    async fn close(self) -> Result<()> {
        let Self {
            client, endpoint, ..
        } = self;

        client.close().await.map_err(|e| HarvestError::Browser {
            url: endpoint,
            message: format!("failed to close session: {}", e),
        })
    }
}

/// WebDriver reports an expired page-load timeout with the `timeout` status
fn is_navigation_timeout(error: &CmdError) -> bool {
    error.is_timeout()
}

/// How long to wait for the page source after navigation
fn source_limit(wait: Duration, navigation_stalled: bool) -> Duration {
    if navigation_stalled {
        wait + NAVIGATION_GRACE
    } else {
        wait
    }
}

fn is_lost_session(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("unable to find session") || message.contains("invalid session id")
}

fn navigation_error(error: CmdError, context: &str, url: &str) -> HarvestError {
    ::log::error!("Failed while {} {}: {}", context, url, error);
    HarvestError::Browser {
        url: url.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::{ErrorStatus, WebDriver};

    #[test]
    fn test_firefox_capabilities() {
        let caps = capabilities(Browser::Firefox, Some("TestAgent/1.0"), Duration::from_secs(30));

        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(caps["timeouts"]["pageLoad"], 30_000);
        let options = &caps["moz:firefoxOptions"];
        assert_eq!(options["args"], json!(["-headless", "-private"]));
        assert_eq!(
            options["prefs"]["general.useragent.override"],
            "TestAgent/1.0"
        );
    }

    #[test]
    fn test_chrome_capabilities() {
        let caps = capabilities(Browser::Chrome, Some("TestAgent/1.0"), Duration::from_secs(5));

        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--incognito")));
        assert!(args.contains(&json!("--user-agent=TestAgent/1.0")));
    }

    #[test]
    fn test_capabilities_without_user_agent() {
        let caps = capabilities(Browser::Firefox, None, Duration::from_secs(1));
        assert!(caps["moz:firefoxOptions"]["prefs"]
            .as_object()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_navigation_timeout_uses_webdriver_status() {
        let timeout = CmdError::Standard(WebDriver::new(ErrorStatus::Timeout, "page load"));
        assert!(is_navigation_timeout(&timeout));

        let look_alike = CmdError::Standard(WebDriver::new(
            ErrorStatus::UnknownError,
            "proxy timeout while resolving host",
        ));
        assert!(!is_navigation_timeout(&look_alike));
        assert!(!is_navigation_timeout(&CmdError::WaitTimeout));
    }

    #[test]
    fn test_source_limit_extends_after_stalled_navigation() {
        let wait = Duration::from_secs(30);
        assert_eq!(source_limit(wait, false), wait);
        assert_eq!(source_limit(wait, true), wait + NAVIGATION_GRACE);
    }

    #[test]
    fn test_lost_session_detection() {
        assert!(is_lost_session("Unable to find session with ID abc"));
        assert!(is_lost_session("invalid session id: session deleted"));
        assert!(!is_lost_session("no such element"));
    }
}
