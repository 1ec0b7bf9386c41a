use crate::config::HarvestConfig;
use crate::crawlers::fetcher::{PageFetcher, SessionFactory};
use crate::error::{HarvestError, Result};
use crate::filter::UrlFilter;
use crate::parsers::{ListingSelectors, listing};
use crate::results::SeedSite;
use std::time::Duration;
use url::Url;

/// Limits applied to every seed walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// How long a single listing page may take to render
    pub timeout: Duration,

    /// Stop after this many listing pages
    pub max_pages: Option<u32>,

    /// Suffix for pages after the first; `{page}` is replaced by the page number
    pub page_suffix: String,
}

impl WalkOptions {
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            timeout: config.page_timeout(),
            max_pages: config.max_pages,
            page_suffix: config.page_suffix.clone(),
        }
    }
}

/// Builds the address of listing page `page` (1-based) for a seed
pub fn page_url(seed: &str, page: u32, suffix: &str) -> String {
    if page <= 1 {
        return seed.to_string();
    }

    format!(
        "{}{}",
        seed.trim_end_matches('/'),
        suffix.replace("{page}", &page.to_string())
    )
}

/// Follows "next page" links on a seed site and collects post links
pub struct PaginationWalker<F> {
    factory: F,
    options: WalkOptions,
    selectors: ListingSelectors,
    filter: UrlFilter,
}

impl<F: SessionFactory> PaginationWalker<F> {
    pub fn new(
        factory: F,
        options: WalkOptions,
        selectors: ListingSelectors,
        filter: UrlFilter,
    ) -> Self {
        Self {
            factory,
            options,
            selectors,
            filter,
        }
    }

    /// Walks every listing page of `seed` and returns its post links in page order.
    ///
    /// One session is opened per walk and closed on every exit path.
    pub async fn walk(&self, seed: &SeedSite) -> Result<Vec<String>> {
        let seed_url = Url::parse(&seed.url).map_err(|source| HarvestError::InvalidUrl {
            url: seed.url.clone(),
            source,
        })?;

        if self.options.max_pages == Some(0) {
            return Ok(Vec::new());
        }

        let mut fetcher = self.factory.open().await?;
        let result = self.walk_pages(&mut fetcher, seed, &seed_url).await;

        if let Err(e) = fetcher.close().await {
            ::log::warn!("Failed to close session for {}: {}", seed.url, e);
        }

        result
    }

    async fn walk_pages(
        &self,
        fetcher: &mut F::Fetcher,
        seed: &SeedSite,
        seed_url: &Url,
    ) -> Result<Vec<String>> {
        let mut post_urls = Vec::new();
        let mut current_page: u32 = 1;

        loop {
            let url = page_url(&seed.url, current_page, &self.options.page_suffix);
            let page = fetcher.fetch(&url, self.options.timeout).await?;

            if page.timed_out {
                ::log::warn!("Timeout waiting for listing content on {}", url);
            }

            let result = listing::parse(&page.html, &self.selectors);
            let found = self.collect_links(&url, seed_url, &result.post_links, &mut post_urls);
            ::log::info!("Found {} post links on {}", found, url);

            let reached_cap = self
                .options
                .max_pages
                .is_some_and(|max| current_page >= max);

            if !result.has_next_page || reached_cap {
                ::log::debug!(
                    "Stopping {} after page {} (next page: {}, cap reached: {})",
                    seed.url,
                    current_page,
                    result.has_next_page,
                    reached_cap
                );
                break;
            }

            current_page += 1;
        }

        Ok(post_urls)
    }

    /// Resolves, filters and normalizes hrefs found on `page_url`; returns how many were kept
    fn collect_links(
        &self,
        page_url: &str,
        seed_url: &Url,
        hrefs: &[String],
        into: &mut Vec<String>,
    ) -> usize {
        let base = Url::parse(page_url).unwrap_or_else(|_| seed_url.clone());
        let before = into.len();

        for href in hrefs {
            let resolved = match base.join(href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    ::log::debug!("Skipping unparseable link {:?}: {}", href, e);
                    continue;
                }
            };

            if !self.filter.should_keep(&resolved, seed_url) {
                ::log::debug!("URL filter rejected: {}", resolved);
                continue;
            }

            into.push(self.filter.normalize_url(&resolved).to_string());
        }

        into.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::{StubLog, StubSessionFactory};
    use crate::filter::UrlFilterConfig;

    const SEED: &str = "https://blog.example.com";

    fn listing_html(links: &[&str], has_next: bool) -> String {
        let mut html = String::from("<html><body>");
        for link in links {
            html.push_str(&format!(r#"<a class="more-link" href="{}">Read more</a>"#, link));
        }
        if has_next {
            html.push_str(r#"<a class="nextpostslink" href="/page/next/">»</a>"#);
        }
        html.push_str("</body></html>");
        html
    }

    fn options(max_pages: Option<u32>) -> WalkOptions {
        WalkOptions {
            timeout: Duration::from_millis(50),
            max_pages,
            page_suffix: "/page/{page}/?et_blog".to_string(),
        }
    }

    fn walker(
        factory: StubSessionFactory,
        max_pages: Option<u32>,
    ) -> PaginationWalker<StubSessionFactory> {
        PaginationWalker::new(
            factory,
            options(max_pages),
            ListingSelectors::default(),
            UrlFilter::default(),
        )
    }

    /// A blog whose listing pages never run out
    fn endless_blog(pages: u32) -> StubSessionFactory {
        (1..=pages).fold(StubSessionFactory::new(), |factory, n| {
            factory.with_page(
                page_url(SEED, n, "/page/{page}/?et_blog"),
                listing_html(&[&format!("{}/post-{}/", SEED, n)], true),
            )
        })
    }

    #[test]
    fn test_page_url() {
        let suffix = "/page/{page}/?et_blog";
        assert_eq!(page_url(SEED, 1, suffix), SEED);
        assert_eq!(
            page_url(SEED, 2, suffix),
            "https://blog.example.com/page/2/?et_blog"
        );
        assert_eq!(
            page_url("https://blog.example.com/news/", 3, suffix),
            "https://blog.example.com/news/page/3/?et_blog"
        );
        assert_eq!(
            page_url(SEED, 4, "?paged={page}"),
            "https://blog.example.com?paged=4"
        );
    }

    #[tokio::test]
    async fn test_walks_until_no_next_page() {
        let factory = StubSessionFactory::new()
            .with_page(
                SEED,
                listing_html(
                    &[
                        "https://blog.example.com/a/",
                        "https://blog.example.com/b/",
                        "https://blog.example.com/c/",
                    ],
                    true,
                ),
            )
            .with_page(
                "https://blog.example.com/page/2/?et_blog",
                listing_html(
                    &["https://blog.example.com/d/", "https://blog.example.com/e/"],
                    false,
                ),
            );
        let walker = walker(factory.clone(), None);

        let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://blog.example.com/a/",
                "https://blog.example.com/b/",
                "https://blog.example.com/c/",
                "https://blog.example.com/d/",
                "https://blog.example.com/e/",
            ]
        );

        let log = factory.log();
        assert_eq!(log.fetched.len(), 2);
        assert_eq!(log.opened, 1);
        assert_eq!(log.closed, 1);
    }

    #[tokio::test]
    async fn test_single_page_without_next_link() {
        let factory = StubSessionFactory::new().with_page(
            SEED,
            listing_html(&["https://blog.example.com/only/"], false),
        );
        let walker = walker(factory.clone(), None);

        let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
        assert_eq!(urls, vec!["https://blog.example.com/only/"]);
        assert_eq!(factory.log().fetched, vec![SEED.to_string()]);
    }

    #[tokio::test]
    async fn test_max_pages_caps_fetches() {
        for max in 1..=4 {
            let factory = endless_blog(10);
            let walker = walker(factory.clone(), Some(max));

            let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
            assert_eq!(urls.len(), max as usize);
            assert_eq!(factory.log().fetched.len(), max as usize);
        }
    }

    #[tokio::test]
    async fn test_zero_max_pages_fetches_nothing() {
        let factory = endless_blog(3);
        let walker = walker(factory.clone(), Some(0));

        let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
        assert!(urls.is_empty());
        assert_eq!(factory.log(), StubLog::default());
    }

    #[tokio::test]
    async fn test_stalled_page_is_parsed_best_effort() {
        let factory = StubSessionFactory::new().with_stalled_page(
            SEED,
            listing_html(&["https://blog.example.com/partial/"], false),
        );
        let walker = walker(factory, None);

        let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
        assert_eq!(urls, vec!["https://blog.example.com/partial/"]);
    }

    #[tokio::test]
    async fn test_seed_without_expected_structure_is_empty() {
        // Unknown to the stub: empty document, load marker never appears
        let factory = StubSessionFactory::new();
        let walker = walker(factory.clone(), None);

        let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
        assert!(urls.is_empty());
        assert_eq!(factory.log().fetched.len(), 1);
        assert_eq!(factory.log().closed, 1);
    }

    #[tokio::test]
    async fn test_session_closed_when_page_fails() {
        let factory = StubSessionFactory::new()
            .with_page(SEED, listing_html(&["https://blog.example.com/a/"], true))
            .with_failing_page("https://blog.example.com/page/2/?et_blog");
        let walker = walker(factory.clone(), None);

        let result = walker.walk(&SeedSite::new(SEED)).await;
        assert!(matches!(result, Err(HarvestError::Browser { .. })));

        let log = factory.log();
        assert_eq!(log.opened, 1);
        assert_eq!(log.closed, 1);
    }

    #[tokio::test]
    async fn test_session_start_failure() {
        let walker = walker(StubSessionFactory::new().refusing_sessions(), None);

        let result = walker.walk(&SeedSite::new(SEED)).await;
        assert!(matches!(result, Err(HarvestError::SessionStart { .. })));
    }

    #[tokio::test]
    async fn test_invalid_seed_url() {
        let factory = StubSessionFactory::new();
        let walker = walker(factory.clone(), None);

        let result = walker.walk(&SeedSite::new("not a url")).await;
        assert!(matches!(result, Err(HarvestError::InvalidUrl { .. })));
        assert_eq!(factory.log().opened, 0);
    }

    #[tokio::test]
    async fn test_links_are_resolved_filtered_and_normalized() {
        let factory = StubSessionFactory::new().with_page(
            SEED,
            listing_html(
                &[
                    "/relative/#more-12",
                    "https://elsewhere.org/syndicated/",
                    "https://blog.example.com/2024/kept/",
                    "https://blog.example.com/tag/skipped/",
                ],
                false,
            ),
        );
        let filter = UrlFilter::new(UrlFilterConfig {
            allow_external: false,
            include_patterns: vec![],
            exclude_patterns: vec!["/tag/".to_string()],
        })
        .unwrap();
        let walker = PaginationWalker::new(
            factory,
            options(None),
            ListingSelectors::default(),
            filter,
        );

        let urls = walker.walk(&SeedSite::new(SEED)).await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://blog.example.com/relative/",
                "https://blog.example.com/2024/kept/",
            ]
        );
    }
}
