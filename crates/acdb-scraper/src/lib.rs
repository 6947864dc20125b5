pub mod error;
pub mod fetch;
mod html;
pub mod pagination;
pub mod parse;
pub mod sites;

pub use error::ScraperError;
pub use fetch::{HttpFetcher, PageFetcher};
pub use pagination::{collect_listings, MAX_PAGES};
pub use sites::{all_extractors, extractor_for, ListPage, PaginationSignal, SiteExtractor};
