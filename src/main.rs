use clap::Parser;
use post_harvest::output::{write_records_json, write_urls_csv};
use post_harvest::seeds::read_seeds;
use post_harvest::{Harvest, HarvestError};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), HarvestError> {
    let harvest = configure(&args)?;

    let seeds = read_seeds(&args.seeds, args.delimiter)?;
    ::log::info!(
        "Loaded {} seed sites from {}",
        seeds.len(),
        args.seeds.display()
    );

    println!("Note: listing pages are rendered through a WebDriver server (e.g. geckodriver).");
    println!(
        "Using {}; set WEBDRIVER_URL or --webdriver-url to change it.",
        harvest.config().webdriver_url
    );

    let start_time = std::time::Instant::now();

    let discovery = harvest.discover(&seeds).await?;
    write_urls_csv(&args.urls_out, &discovery.urls)?;
    ::log::info!(
        "Saved {} post URLs to {}",
        discovery.urls.len(),
        args.urls_out.display()
    );
    for failure in &discovery.failures {
        ::log::warn!("Seed {} was skipped: {}", failure.seed, failure.error);
    }

    if args.urls_only {
        return Ok(());
    }

    let extraction = harvest.extract(&discovery.urls).await?;
    write_records_json(&args.data_out, &extraction.records)?;
    ::log::info!(
        "Saved {} records to {} ({} failed)",
        extraction.records.len(),
        args.data_out.display(),
        extraction.failed
    );

    ::log::info!(
        "Harvest complete in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Layers defaults, the config file, `WEBDRIVER_URL` and command-line options
fn configure(args: &Args) -> Result<Harvest, HarvestError> {
    let mut harvest = match &args.config {
        Some(path) => Harvest::from_config_file(path)?,
        None => Harvest::default(),
    };

    if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
        if !webdriver_url.is_empty() {
            harvest = harvest.with_webdriver_url(webdriver_url);
        }
    }

    if let Some(url) = &args.webdriver_url {
        harvest = harvest.with_webdriver_url(url.clone());
    }
    if let Some(browser) = args.browser {
        harvest = harvest.with_browser(browser.into());
    }
    if let Some(timeout) = args.timeout {
        harvest = harvest.with_page_timeout(timeout);
    }
    if args.max_pages.is_some() {
        harvest = harvest.with_max_pages(args.max_pages);
    }
    if let Some(concurrency) = args.concurrency {
        harvest = harvest.with_max_concurrency(concurrency);
    }
    if let Some(seed_concurrency) = args.seed_concurrency {
        harvest = harvest.with_seed_concurrency(seed_concurrency);
    }
    if args.quiet {
        harvest = harvest.with_progress(false);
    }

    Ok(harvest)
}
