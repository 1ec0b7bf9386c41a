pub mod fetcher;
pub mod stub;
pub mod walker;
pub mod web;

pub use fetcher::{PageFetcher, SessionFactory};
pub use stub::{StubLog, StubSessionFactory};
pub use walker::{PaginationWalker, WalkOptions, page_url};
pub use web::WebDriverSessionFactory;
