use clap::{Parser, ValueEnum};
use post_harvest::config::Browser;
use post_harvest::output::{DEFAULT_DATA_PATH, DEFAULT_URLS_PATH};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "post-harvest")]
#[command(about = "Discovers blog posts across paginated listings and extracts their content")]
#[command(version)]
pub struct Args {
    /// Delimited file listing the seed sites (needs a `url` column)
    pub seeds: PathBuf,

    /// Column delimiter of the seed file
    #[arg(short, long, default_value = ";", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// JSON configuration file; command-line options take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint (e.g. geckodriver)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Browser to drive for listing pages
    #[arg(short, long, value_enum)]
    pub browser: Option<BrowserArg>,

    /// Seconds to wait for each listing page to render
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Maximum listing pages per seed site
    #[arg(short, long)]
    pub max_pages: Option<u32>,

    /// Number of posts extracted concurrently
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Number of seed sites walked concurrently
    #[arg(long)]
    pub seed_concurrency: Option<usize>,

    /// Where to write the discovered post URLs
    #[arg(long, default_value = DEFAULT_URLS_PATH)]
    pub urls_out: PathBuf,

    /// Where to write the extracted posts
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    pub data_out: PathBuf,

    /// Stop after discovering post URLs
    #[arg(long)]
    pub urls_only: bool,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BrowserArg {
    Firefox,
    Chrome,
}

impl From<BrowserArg> for Browser {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Firefox => Browser::Firefox,
            BrowserArg::Chrome => Browser::Chrome,
        }
    }
}

/// Accepts a single ASCII character as the seed file delimiter
fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("delimiter must be a single ASCII character, got {:?}", value)),
    }
}
