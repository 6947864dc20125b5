use std::time::Duration;

use acdb_core::{DetailFields, ListingRecord, Retailer};
use scraper::Html;

use super::{ListPage, PaginationSignal, SiteExtractor, SLOW_SITE_TIMEOUT};
use crate::html::{absolutize, attr, first_text, select_all, select_first, text_of};
use crate::parse::{normalize_currency, parse_area, parse_digits_before, parse_price};

const ORIGIN: &str = "https://termoformat.md";
const CATALOG_PATH: &str = "/ru/kondicioneri/split_sistemi/1";

/// Split systems at termoformat.md, paginated by a "next" arrow link.
#[derive(Debug, Clone)]
pub struct Termoformat {
    origin: String,
}

impl Default for Termoformat {
    fn default() -> Self {
        Self::with_origin(ORIGIN)
    }
}

impl Termoformat {
    #[must_use]
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }
}

impl SiteExtractor for Termoformat {
    fn retailer(&self) -> Retailer {
        Retailer::Termoformat
    }

    fn entry_url(&self) -> String {
        format!("{}{CATALOG_PATH}", self.origin)
    }

    fn request_timeout(&self) -> Option<Duration> {
        Some(SLOW_SITE_TIMEOUT)
    }

    fn parse_list_page(&self, html: &str) -> ListPage {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let listings = select_all(root, "div.product-info a.product-name.nolink")
            .into_iter()
            .filter_map(|link| {
                let href = attr(link, "href")?;
                let name = first_text(link, "span[itemprop='name']")?;
                ListingRecord::new(&name, &absolutize(&self.origin, &href), Retailer::Termoformat)
            })
            .collect();

        let next = select_first(root, "div.pagination a.arrow.right")
            .and_then(|a| attr(a, "href"))
            .map(|href| absolutize(&self.origin, &href));

        ListPage {
            listings,
            signal: PaginationSignal::NextPage(next),
        }
    }

    fn has_detail_pages(&self) -> bool {
        true
    }

    fn parse_detail_page(&self, html: &str) -> DetailFields {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let mut detail = DetailFields {
            name: first_text(root, "span[itemprop='name']"),
            price: first_text(root, "div.main-price span[itemprop='price']")
                .and_then(|t| parse_price(&t)),
            currency: first_text(root, "div.main-price small[itemprop='priceCurrency']")
                .and_then(|t| normalize_currency(&t)),
            ..DetailFields::default()
        };

        for row in select_all(root, "tr") {
            let (Some(name), Some(value)) = (
                first_text(row, "td.param-name"),
                first_text(row, "td.param-value"),
            ) else {
                continue;
            };
            if name.contains("Производительность") && value.contains("BTU") {
                detail.btu = parse_digits_before(&value, "BTU");
            }
            if name.contains("Рекомендуемая площадь") {
                detail.service_area = parse_area(&value);
            }
        }

        detail
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn list_page_reports_next_link() {
        let html = r#"
          <div class="product-info">
            <a class="product-name nolink" href="/ru/kondicioneri/ac-gree-09"><span itemprop="name">Gree Pular 09</span></a>
          </div>
          <div class="product-info">
            <a class="product-name nolink" href="/ru/kondicioneri/ac-blank"></a>
          </div>
          <div class="pagination"><a class="arrow left" href="/x/0">‹</a><a class="arrow right" href="/ru/kondicioneri/split_sistemi/2">›</a></div>"#;
        let page = Termoformat::default().parse_list_page(html);
        assert_eq!(page.listings.len(), 1);
        assert_eq!(page.listings[0].name, "Gree Pular 09");
        assert_eq!(
            page.listings[0].url,
            "https://termoformat.md/ru/kondicioneri/ac-gree-09"
        );
        assert_eq!(
            page.signal,
            PaginationSignal::NextPage(Some(
                "https://termoformat.md/ru/kondicioneri/split_sistemi/2".to_string()
            ))
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let page = Termoformat::default().parse_list_page("<div class=\"pagination\"></div>");
        assert_eq!(page.signal, PaginationSignal::NextPage(None));
    }

    #[test]
    fn detail_page_reads_parameter_table() {
        let html = r#"
          <h1><span itemprop="name">Gree Pular 09 Inverter</span></h1>
          <div class="main-price"><span itemprop="price">9 850</span> <small itemprop="priceCurrency">MDL</small></div>
          <table>
            <tr><td class="param-name">Производительность (охлаждение)</td><td class="param-value">9 000 BTU/h</td></tr>
            <tr><td class="param-name">Производительность (обогрев)</td><td class="param-value">2.9 кВт</td></tr>
            <tr><td class="param-name">Рекомендуемая площадь</td><td class="param-value">25 м²</td></tr>
          </table>"#;
        let detail = Termoformat::default().parse_detail_page(html);
        assert_eq!(detail.name.as_deref(), Some("Gree Pular 09 Inverter"));
        assert_eq!(detail.price, Some(Decimal::new(9_850, 0)));
        assert_eq!(detail.currency.as_deref(), Some("MDL"));
        assert_eq!(detail.btu, Some(9_000));
        assert_eq!(detail.service_area, Some(25.0));
    }
}
