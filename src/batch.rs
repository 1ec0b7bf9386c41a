//! Batch drivers running the walker over every seed and the extractor over every post.

use crate::crawlers::{PaginationWalker, SessionFactory};
use crate::extractor::ContentExtractor;
use crate::results::{DiscoveryReport, ExtractedRecord, ExtractionReport, SeedFailure, SeedSite};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;

/// Creates a progress bar, or a hidden one when progress output is disabled
pub fn progress_bar(len: usize, message: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg}: [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message);
    pb
}

/// Removes duplicate URLs, keeping the first occurrence of each
pub fn dedup_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Walks every seed and returns the deduplicated post URLs.
///
/// Up to `seed_concurrency` seeds are walked at once, each in its own
/// session. Results are concatenated in seed order regardless. A failing
/// seed is recorded and the remaining seeds still run.
pub async fn extract_urls<F: SessionFactory>(
    walker: &PaginationWalker<F>,
    seeds: &[SeedSite],
    seed_concurrency: usize,
    show_progress: bool,
) -> DiscoveryReport {
    let pb = progress_bar(seeds.len(), "Scraping blogpost URLs", show_progress);

    let outcomes = stream::iter(seeds)
        .map(|seed| {
            let pb = &pb;
            async move {
                let outcome = walker.walk(seed).await;
                pb.inc(1);
                (seed, outcome)
            }
        })
        .buffered(seed_concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    pb.finish();

    let mut raw = Vec::new();
    let mut failures = Vec::new();
    for (seed, outcome) in outcomes {
        match outcome {
            Ok(urls) => {
                ::log::info!("Collected {} post links from {}", urls.len(), seed.url);
                raw.extend(urls);
            }
            Err(e) => {
                ::log::error!("Walk of {} failed: {}", seed.url, e);
                failures.push(SeedFailure {
                    seed: seed.url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let raw_count = raw.len();
    let urls = dedup_urls(raw);
    ::log::info!(
        "Discovered {} unique post URLs ({} before deduplication, {} seeds failed)",
        urls.len(),
        raw_count,
        failures.len()
    );

    DiscoveryReport {
        urls,
        raw_count,
        failures,
    }
}

/// Extracts every URL through an ordered pool of at most `max_concurrency` requests.
///
/// The records line up with `urls`. A URL that cannot be fetched yields a
/// record carrying the error instead of aborting the batch.
pub async fn extract_data(
    extractor: &ContentExtractor,
    urls: &[String],
    max_concurrency: usize,
    show_progress: bool,
) -> ExtractionReport {
    let pb = progress_bar(urls.len(), "Extracting blogpost data", show_progress);

    let records = stream::iter(urls)
        .map(|url| {
            let pb = &pb;
            async move {
                let record = match extractor.extract(url).await {
                    Ok(record) => record,
                    Err(e) => {
                        ::log::warn!("Failed to extract {}: {}", url, e);
                        ExtractedRecord::failed(url.as_str(), e)
                    }
                };
                pb.inc(1);
                record
            }
        })
        .buffered(max_concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    pb.finish();

    let failed = records.iter().filter(|r| r.is_failed()).count();
    ::log::info!(
        "Extracted {} posts ({} failed)",
        records.len() - failed,
        failed
    );

    ExtractionReport { records, failed }
}
