use acdb_core::{ListingRecord, Retailer};
use scraper::{ElementRef, Html};

use super::{apply_spec_row, ListPage, PaginationSignal, SiteExtractor};
use crate::html::{absolutize, attr, max_page_number, select_all, select_first, text_of};
use crate::parse::parse_price_digits;

const ORIGIN: &str = "https://eurosanteh.md";
const CATALOG_PATH: &str = "/ru/nastennye-kondicionery-split-sistemy/";

/// Split systems at eurosanteh.md.
#[derive(Debug, Clone)]
pub struct Eurosanteh {
    origin: String,
}

impl Default for Eurosanteh {
    fn default() -> Self {
        Self::with_origin(ORIGIN)
    }
}

impl Eurosanteh {
    #[must_use]
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<ListingRecord> {
        let title = select_first(card, "a.prod_title")?;
        let href = attr(title, "href")?;
        let mut listing = ListingRecord::new(
            &text_of(title),
            &absolutize(&self.origin, &href),
            Retailer::Eurosanteh,
        )?;

        for row in select_all(card, "div.prod_param_row") {
            let (Some(title), Some(value)) = (
                select_first(row, "div.prod_param_title"),
                select_first(row, "div.prod_param_value"),
            ) else {
                continue;
            };
            apply_spec_row(&mut listing, &text_of(title), &text_of(value));
        }

        listing.price = select_first(card, "div.prod_price")
            .map(text_of)
            .and_then(|t| parse_price_digits(&t));

        Some(listing)
    }
}

impl SiteExtractor for Eurosanteh {
    fn retailer(&self) -> Retailer {
        Retailer::Eurosanteh
    }

    fn entry_url(&self) -> String {
        self.page_url(1)
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}{CATALOG_PATH}?page={}", self.origin, page.max(1))
    }

    fn parse_list_page(&self, html: &str) -> ListPage {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let listings = select_all(root, "div.prod_card")
            .into_iter()
            .filter_map(|card| self.parse_card(card))
            .collect();

        ListPage {
            listings,
            signal: PaginationSignal::TotalPages(max_page_number(root, "ul.pagination a.pagelink")),
        }
    }
}
