//! Per-retailer catalog extractors.
//!
//! Each retailer gets its own [`SiteExtractor`] implementation; they share
//! no state and are selected by [`Retailer`] in [`extractor_for`].

mod conditionere;
mod eurosanteh;
mod gree;
mod jara;
mod termocontrol;
mod termoformat;

use std::time::Duration;

use acdb_core::{DetailFields, ListingRecord, Retailer};

use crate::parse::{parse_area, parse_int_with_unit};

pub use conditionere::Conditionere;
pub use eurosanteh::Eurosanteh;
pub use gree::Gree;
pub use jara::Jara;
pub use termocontrol::Termocontrol;
pub use termoformat::Termoformat;

/// Fixed timeout used by the retailers whose sites are known to stall.
pub(crate) const SLOW_SITE_TIMEOUT: Duration = Duration::from_secs(10);

/// How a catalog page says whether more pages follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationSignal {
    /// Total page count, read from the first page.
    TotalPages(u32),
    /// Absolute URL of the next page, `None` on the last page.
    NextPage(Option<String>),
    /// Numbered pages continue until a fetch fails or a page is empty.
    Implicit,
    /// The whole catalog fits on the entry page.
    Single,
}

/// Result of extracting one catalog page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub listings: Vec<ListingRecord>,
    pub signal: PaginationSignal,
}

/// Markup traversal for one retailer's catalog.
pub trait SiteExtractor: Send + Sync {
    fn retailer(&self) -> Retailer;

    /// URL of the first catalog page.
    fn entry_url(&self) -> String;

    /// URL of catalog page `page` (1-based). Catalogs that never number
    /// their pages return the entry URL.
    fn page_url(&self, page: u32) -> String {
        let _ = page;
        self.entry_url()
    }

    /// Per-request timeout; `None` uses the fetcher default.
    fn request_timeout(&self) -> Option<Duration> {
        None
    }

    fn parse_list_page(&self, html: &str) -> ListPage;

    /// Whether capacity and area live on per-listing detail pages.
    fn has_detail_pages(&self) -> bool {
        false
    }

    fn parse_detail_page(&self, html: &str) -> DetailFields {
        let _ = html;
        DetailFields::default()
    }

    /// Pause between consecutive detail fetches.
    fn detail_delay(&self) -> Option<Duration> {
        None
    }
}

/// Builds the extractor for `retailer` against its live site.
#[must_use]
pub fn extractor_for(retailer: Retailer) -> Box<dyn SiteExtractor> {
    match retailer {
        Retailer::Conditionere => Box::new(Conditionere::default()),
        Retailer::Eurosanteh => Box::new(Eurosanteh::default()),
        Retailer::Gree => Box::new(Gree::default()),
        Retailer::Jara => Box::new(Jara::default()),
        Retailer::Termoformat => Box::new(Termoformat::default()),
        Retailer::Termocontrol => Box::new(Termocontrol::default()),
    }
}

#[must_use]
pub fn all_extractors() -> Vec<Box<dyn SiteExtractor>> {
    Retailer::ALL.into_iter().map(extractor_for).collect()
}

/// Applies one "title / value" spec row from a product card. Shared by the
/// retailers whose cards label capacity as "Мощность ... BTU".
pub(crate) fn apply_spec_row(listing: &mut ListingRecord, title: &str, value: &str) {
    if title.contains("Мощность") && title.contains("BTU") {
        listing.btu = parse_int_with_unit(value);
    } else if title.contains("Площадь помещения") {
        listing.service_area = parse_area(value);
    }
}
