use std::time::Duration;

use acdb_core::{ListingRecord, Retailer};
use scraper::{ElementRef, Html};

use super::{apply_spec_row, ListPage, PaginationSignal, SiteExtractor, SLOW_SITE_TIMEOUT};
use crate::html::{absolutize, attr, max_page_number, select_all, select_first, text_of};
use crate::parse::parse_price;

const ORIGIN: &str = "https://conditionere.md";
const CATALOG_PATH: &str = "/ru/nastennye-kondicionery/";

/// Wall-mounted units at conditionere.md. Cards carry every field; the page
/// count comes from the numbered pagination links.
#[derive(Debug, Clone)]
pub struct Conditionere {
    origin: String,
}

impl Default for Conditionere {
    fn default() -> Self {
        Self::with_origin(ORIGIN)
    }
}

impl Conditionere {
    #[must_use]
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<ListingRecord> {
        let title = select_first(card, "a.prod_card_title")?;
        let href = attr(title, "href")?;
        let mut listing = ListingRecord::new(
            &text_of(title),
            &absolutize(&self.origin, &href),
            Retailer::Conditionere,
        )?;

        listing.price = select_first(card, "div.prod_card_price")
            .map(text_of)
            .and_then(|t| parse_price(&t));

        for row in select_all(card, "div.pcp_row") {
            let (Some(title), Some(value)) = (
                select_first(row, "div.pcp_title"),
                select_first(row, "div.pcp_value"),
            ) else {
                continue;
            };
            apply_spec_row(&mut listing, &text_of(title), &text_of(value));
        }

        Some(listing)
    }
}

impl SiteExtractor for Conditionere {
    fn retailer(&self) -> Retailer {
        Retailer::Conditionere
    }

    fn entry_url(&self) -> String {
        format!("{}{CATALOG_PATH}", self.origin)
    }

    fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.entry_url()
        } else {
            format!("{}?page={page}", self.entry_url())
        }
    }

    fn request_timeout(&self) -> Option<Duration> {
        Some(SLOW_SITE_TIMEOUT)
    }

    fn parse_list_page(&self, html: &str) -> ListPage {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let listings = select_all(root, "div.prod_card.transition")
            .into_iter()
            .filter_map(|card| self.parse_card(card))
            .collect();

        ListPage {
            listings,
            signal: PaginationSignal::TotalPages(max_page_number(root, "ul.pagination a.pagelink")),
        }
    }
}
