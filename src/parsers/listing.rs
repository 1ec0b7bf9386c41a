use crate::parsers::ListingSelectors;
use crate::results::PageResult;
use scraper::Html;

/// Parses a listing page for "read more" links and a next-page link
pub fn parse(html: &str, selectors: &ListingSelectors) -> PageResult {
    let doc = Html::parse_document(html);

    let post_links = doc
        .select(&selectors.more_link)
        .filter_map(|e| e.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| href.to_string())
        .collect::<Vec<String>>();

    let has_next_page = doc.select(&selectors.next_page).next().is_some();

    ::log::debug!(
        "Listing parser found {} post links (next page: {})",
        post_links.len(),
        has_next_page
    );

    PageResult {
        post_links,
        has_next_page,
    }
}
