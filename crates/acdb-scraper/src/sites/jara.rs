use acdb_core::{DetailFields, ListingRecord, Retailer};
use scraper::{ElementRef, Html};

use super::{ListPage, PaginationSignal, SiteExtractor};
use crate::html::{absolutize, attr, first_text, select_all, select_first, text_of};
use crate::parse::{parse_area, parse_int_with_unit, parse_price};

const ORIGIN: &str = "https://jara.md";
const CATALOG_PATH: &str = "/ru/bytovye-kondicionery/";

/// Household units at jara.md. Cards show name and price only; capacity and
/// area are read from each product page.
#[derive(Debug, Clone)]
pub struct Jara {
    origin: String,
}

impl Default for Jara {
    fn default() -> Self {
        Self::with_origin(ORIGIN)
    }
}

impl Jara {
    #[must_use]
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<ListingRecord> {
        let href = select_first(card, "a.pcard_top").and_then(|a| attr(a, "href"))?;
        let name = first_text(card, "span.pcard_title")?;
        let mut listing =
            ListingRecord::new(&name, &absolutize(&self.origin, &href), Retailer::Jara)?;
        listing.price = first_text(card, "div.pcard_price").and_then(|t| parse_price(&t));
        Some(listing)
    }
}

/// The last page number sits in the second-to-last pagination item (the
/// last one is the "next" arrow).
fn last_page_number(root: ElementRef<'_>) -> u32 {
    let Some(pagination) = select_first(root, "ul.pagination.df.ac") else {
        return 1;
    };
    let items = select_all(pagination, "li");
    if items.len() < 2 {
        return 1;
    }
    select_first(items[items.len() - 2], "a.pagelink")
        .and_then(|a| text_of(a).parse::<u32>().ok())
        .unwrap_or(1)
}

/// Row labels are compared lowercased with all whitespace removed.
fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl SiteExtractor for Jara {
    fn retailer(&self) -> Retailer {
        Retailer::Jara
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
            signal: PaginationSignal::TotalPages(last_page_number(root)),
        }
    }

    fn has_detail_pages(&self) -> bool {
        true
    }

    fn parse_detail_page(&self, html: &str) -> DetailFields {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let mut detail = DetailFields {
            name: first_text(root, "h1.prod_title"),
            price: first_text(root, "div.pd_price").and_then(|t| parse_price(&t)),
            ..DetailFields::default()
        };

        for row in select_all(root, "div.pd_params_row") {
            let (Some(title), Some(value)) = (
                select_first(row, "div.pd_param_title"),
                select_first(row, "div.pd_param_value"),
            ) else {
                continue;
            };
            let label = squash(&text_of(title));
            let value = text_of(value);
            if label.contains("мощность,btu") {
                detail.btu = parse_int_with_unit(&value);
            }
            if label.contains("площадьпомещения") {
                detail.service_area = parse_area(&value);
            }
        }

        detail
    }
}
