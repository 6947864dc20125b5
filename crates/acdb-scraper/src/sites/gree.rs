use acdb_core::{ListingRecord, Retailer};
use scraper::{ElementRef, Html};

use super::{ListPage, PaginationSignal, SiteExtractor};
use crate::html::{absolutize, attr, select_all, select_first, text_of};
use crate::parse::{parse_area, parse_int_with_unit, parse_price};

const ORIGIN: &str = "https://gree.com.md";

/// The gree.com.md storefront lists its whole range in one table:
/// name, area, capacity, price.
#[derive(Debug, Clone)]
pub struct Gree {
    origin: String,
}

impl Default for Gree {
    fn default() -> Self {
        Self::with_origin(ORIGIN)
    }
}

impl Gree {
    #[must_use]
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<ListingRecord> {
        let title = select_first(row, "a.line_prod_title")?;
        let href = attr(title, "href")?;
        let mut listing =
            ListingRecord::new(&text_of(title), &absolutize(&self.origin, &href), Retailer::Gree)?;

        let cells = select_all(row, "td");
        listing.service_area = cells.get(1).and_then(|td| parse_area(&text_of(*td)));
        listing.btu = cells.get(2).and_then(|td| parse_int_with_unit(&text_of(*td)));
        listing.price = cells
            .get(3)
            .and_then(|td| select_first(*td, "a"))
            .and_then(|a| parse_price(&text_of(a)));

        Some(listing)
    }
}

impl SiteExtractor for Gree {
    fn retailer(&self) -> Retailer {
        Retailer::Gree
    }

    fn entry_url(&self) -> String {
        format!("{}/ru/", self.origin)
    }

    fn parse_list_page(&self, html: &str) -> ListPage {
        let doc = Html::parse_document(html);
        let listings: Vec<ListingRecord> = select_all(doc.root_element(), "tr.line_prod.transition")
            .into_iter()
            .filter_map(|row| self.parse_row(row))
            .collect();

        if listings.is_empty() {
            tracing::warn!(retailer = %Retailer::Gree, "extract: no product rows found");
        }

        ListPage {
            listings,
            signal: PaginationSignal::Single,
        }
    }
}
