use std::time::Duration;

use acdb_core::{DetailFields, ListingRecord, Retailer};
use scraper::Html;

use super::{ListPage, PaginationSignal, SiteExtractor, SLOW_SITE_TIMEOUT};
use crate::html::{absolutize, attr, first_text, select_all, select_first, text_of};
use crate::parse::{normalize_currency, parse_max_int, parse_price};

const ORIGIN: &str = "https://termocontrol.md";
const CATALOG_PATH: &str = "/ru/catalog/split";
const DETAIL_DELAY: Duration = Duration::from_millis(200);

/// Split systems at termocontrol.md. The catalog has no page count: pages
/// are requested as `/page-N` until one is missing or empty.
#[derive(Debug, Clone)]
pub struct Termocontrol {
    origin: String,
}

impl Default for Termocontrol {
    fn default() -> Self {
        Self::with_origin(ORIGIN)
    }
}

impl Termocontrol {
    #[must_use]
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }
}

impl SiteExtractor for Termocontrol {
    fn retailer(&self) -> Retailer {
        Retailer::Termocontrol
    }

    fn entry_url(&self) -> String {
        format!("{}{CATALOG_PATH}", self.origin)
    }

    fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.entry_url()
        } else {
            format!("{}/page-{page}", self.entry_url())
        }
    }

    fn request_timeout(&self) -> Option<Duration> {
        Some(SLOW_SITE_TIMEOUT)
    }

    fn parse_list_page(&self, html: &str) -> ListPage {
        let doc = Html::parse_document(html);
        let listings = select_all(doc.root_element(), "a.product_preview__name_link")
            .into_iter()
            .filter_map(|link| {
                let href = attr(link, "href")?;
                ListingRecord::new(
                    &text_of(link),
                    &absolutize(&self.origin, &href),
                    Retailer::Termocontrol,
                )
            })
            .collect();

        ListPage {
            listings,
            signal: PaginationSignal::Implicit,
        }
    }

    fn has_detail_pages(&self) -> bool {
        true
    }

    fn parse_detail_page(&self, html: &str) -> DetailFields {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let mut detail = DetailFields {
            name: first_text(root, "h1.block__heading span[itemprop='name']"),
            price: select_first(root, "span.fn_price[itemprop='price']")
                .and_then(|el| attr(el, "content"))
                .and_then(|content| parse_price(&content)),
            currency: first_text(root, "span.currency[itemprop='priceCurrency']")
                .and_then(|t| normalize_currency(&t)),
            ..DetailFields::default()
        };

        // Feature names and values are sibling lists paired by position.
        let names = select_all(root, "div.features__name");
        let values = select_all(root, "div.features__value");
        for (name, value) in names.into_iter().zip(values) {
            let label = text_of(name).to_lowercase();
            let value = text_of(value);
            // "производитель" (manufacturer) shares the stem; only the
            // capacity row counts, and a failed parse never clears a value.
            if label.contains("btu") || label.contains("производительн") {
                if let Some(btu) = parse_max_int(&value) {
                    detail.btu = Some(btu);
                }
            }
            if label.contains("площадь") || label.contains("suprafața") {
                if let Some(area) = parse_max_int(&value) {
                    detail.service_area = Some(f64::from(area));
                }
            }
        }

        detail
    }

    fn detail_delay(&self) -> Option<Duration> {
        Some(DETAIL_DELAY)
    }
}
