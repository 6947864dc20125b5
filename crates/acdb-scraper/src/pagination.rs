//! Drives a [`SiteExtractor`] across every page of a retailer's catalog.
//!
//! Pages are visited in ascending order and listings kept in page order.
//! A failed page fetch is logged and skipped; it never aborts the run.

use std::collections::HashSet;

use acdb_core::ListingRecord;

use crate::fetch::PageFetcher;
use crate::sites::{PaginationSignal, SiteExtractor};

/// Upper bound on catalog pages per run. Guards the implicit and next-link
/// walks against sites that never stop.
pub const MAX_PAGES: u32 = 200;

/// Collects the complete listing set for one retailer.
///
/// Returns an empty list when the entry page cannot be fetched.
pub async fn collect_listings(
    extractor: &dyn SiteExtractor,
    fetcher: &dyn PageFetcher,
) -> Vec<ListingRecord> {
    let retailer = extractor.retailer();
    let timeout = extractor.request_timeout();
    let entry_url = extractor.entry_url();

    let Some(first_html) = fetcher.fetch(&entry_url, timeout).await else {
        tracing::warn!(%retailer, url = %entry_url, "pagination: entry page unavailable");
        return Vec::new();
    };
    let first = extractor.parse_list_page(&first_html);
    let mut listings = first.listings;

    match first.signal {
        PaginationSignal::Single => {}
        PaginationSignal::TotalPages(count) => {
            let last = count.min(MAX_PAGES);
            tracing::debug!(%retailer, pages = last, "pagination: page count known");
            for page in 2..=last {
                let url = extractor.page_url(page);
                let Some(html) = fetcher.fetch(&url, timeout).await else {
                    tracing::warn!(%retailer, page, url = %url, "pagination: skipping page");
                    continue;
                };
                listings.extend(extractor.parse_list_page(&html).listings);
            }
        }
        PaginationSignal::NextPage(next) => {
            let mut seen: HashSet<String> = HashSet::from([entry_url]);
            let mut next = next;
            let mut visited = 1;
            while let Some(url) = next.take() {
                if !seen.insert(url.clone()) {
                    tracing::warn!(%retailer, url = %url, "pagination: next link loops back; stopping");
                    break;
                }
                if visited >= MAX_PAGES {
                    tracing::warn!(%retailer, max_pages = MAX_PAGES, "pagination: page limit reached");
                    break;
                }
                let Some(html) = fetcher.fetch(&url, timeout).await else {
                    tracing::warn!(%retailer, url = %url, "pagination: next page unavailable; stopping");
                    break;
                };
                let page = extractor.parse_list_page(&html);
                listings.extend(page.listings);
                next = match page.signal {
                    PaginationSignal::NextPage(n) => n,
                    _ => None,
                };
                visited += 1;
            }
        }
        PaginationSignal::Implicit => {
            if !listings.is_empty() {
                for page in 2..=MAX_PAGES {
                    let url = extractor.page_url(page);
                    let Some(html) = fetcher.fetch(&url, timeout).await else {
                        tracing::debug!(%retailer, page, "pagination: no further pages");
                        break;
                    };
                    let page_listings = extractor.parse_list_page(&html).listings;
                    if page_listings.is_empty() {
                        tracing::debug!(%retailer, page, "pagination: empty page ends catalog");
                        break;
                    }
                    listings.extend(page_listings);
                }
            }
        }
    }

    tracing::info!(%retailer, count = listings.len(), "pagination: list pages collected");

    if extractor.has_detail_pages() {
        fill_from_detail_pages(extractor, fetcher, &mut listings).await;
    }

    listings
}

/// Outcome counts of one detail pass.
#[derive(Debug, Default, PartialEq, Eq)]
struct DetailPass {
    total: usize,
    failed: usize,
    /// Fetched, but the page yielded no recognizable field.
    empty: usize,
}

/// Fetches each listing's detail page in order and overlays what it finds.
/// A failed fetch keeps the list-page fields; nothing is retried.
async fn fill_from_detail_pages(
    extractor: &dyn SiteExtractor,
    fetcher: &dyn PageFetcher,
    listings: &mut [ListingRecord],
) -> DetailPass {
    let retailer = extractor.retailer();
    let timeout = extractor.request_timeout();
    let delay = extractor.detail_delay();
    let mut pass = DetailPass {
        total: listings.len(),
        ..DetailPass::default()
    };
    let total = pass.total;

    for (index, listing) in listings.iter_mut().enumerate() {
        if index > 0 {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }

        match fetcher.fetch(&listing.url, timeout).await {
            Some(html) => {
                let detail = extractor.parse_detail_page(&html);
                if detail.is_empty() {
                    pass.empty += 1;
                    tracing::debug!(
                        %retailer,
                        url = %listing.url,
                        "pagination: detail page had no recognizable fields"
                    );
                } else {
                    listing.merge_detail(detail);
                }
            }
            None => {
                pass.failed += 1;
                tracing::warn!(
                    %retailer,
                    url = %listing.url,
                    "pagination: detail page unavailable; keeping list fields"
                );
            }
        }

        tracing::debug!(
            %retailer,
            position = index + 1,
            total,
            name = %listing.name,
            btu = ?listing.btu,
            "pagination: detail pass"
        );
    }

    tracing::info!(
        %retailer,
        total,
        failed = pass.failed,
        empty = pass.empty,
        "pagination: detail pass complete"
    );
    pass
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use acdb_core::{DetailFields, Retailer};
    use async_trait::async_trait;

    use super::*;
    use crate::sites::ListPage;

    /// Serves canned bodies by URL and records every request.
    #[derive(Default)]
    struct MapFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str, _timeout: Option<Duration>) -> Option<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    /// Test extractor whose "markup" is a comma-separated list of names
    /// followed by `|` and a pagination directive.
    struct FakeSite {
        signal_kind: &'static str,
        details: bool,
    }

    impl FakeSite {
        fn new(signal_kind: &'static str) -> Self {
            Self {
                signal_kind,
                details: false,
            }
        }
    }

    impl SiteExtractor for FakeSite {
        fn retailer(&self) -> Retailer {
            Retailer::Gree
        }

        fn entry_url(&self) -> String {
            "https://shop.test/p1".to_string()
        }

        fn page_url(&self, page: u32) -> String {
            format!("https://shop.test/p{page}")
        }

        fn parse_list_page(&self, html: &str) -> ListPage {
            let (names, directive) = html.split_once('|').unwrap_or((html, ""));
            let listings = names
                .split(',')
                .filter_map(|n| {
                    ListingRecord::new(n, &format!("https://shop.test/item/{}", n.trim()), Retailer::Gree)
                })
                .collect();
            let signal = match self.signal_kind {
                "total" => PaginationSignal::TotalPages(directive.parse().unwrap_or(1)),
                "next" => PaginationSignal::NextPage(
                    (!directive.is_empty()).then(|| directive.to_string()),
                ),
                "implicit" => PaginationSignal::Implicit,
                _ => PaginationSignal::Single,
            };
            ListPage { listings, signal }
        }

        fn has_detail_pages(&self) -> bool {
            self.details
        }

        fn parse_detail_page(&self, html: &str) -> DetailFields {
            DetailFields {
                btu: html.parse().ok(),
                ..DetailFields::default()
            }
        }
    }

    fn names(listings: &[ListingRecord]) -> Vec<&str> {
        listings.iter().map(|l| l.name.as_str()).collect()
    }

    #[tokio::test]
    async fn total_pages_visits_each_page_once_and_skips_failures() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/p1", "a,b|3")
            .with("https://shop.test/p3", "e|3");

        let listings = collect_listings(&FakeSite::new("total"), &fetcher).await;

        assert_eq!(names(&listings), vec!["a", "b", "e"]);
        assert_eq!(
            fetcher.requests(),
            vec![
                "https://shop.test/p1",
                "https://shop.test/p2",
                "https://shop.test/p3"
            ]
        );
    }

    #[tokio::test]
    async fn unavailable_entry_page_yields_nothing() {
        let fetcher = MapFetcher::default();
        let listings = collect_listings(&FakeSite::new("total"), &fetcher).await;
        assert!(listings.is_empty());
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn next_link_chain_is_followed_until_absent() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/p1", "a|https://shop.test/next-2")
            .with("https://shop.test/next-2", "b|https://shop.test/next-3")
            .with("https://shop.test/next-3", "c|");

        let listings = collect_listings(&FakeSite::new("next"), &fetcher).await;
        assert_eq!(names(&listings), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn next_link_cycle_stops() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/p1", "a|https://shop.test/next-2")
            .with("https://shop.test/next-2", "b|https://shop.test/p1");

        let listings = collect_listings(&FakeSite::new("next"), &fetcher).await;
        assert_eq!(names(&listings), vec!["a", "b"]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn implicit_pages_stop_at_missing_page() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/p1", "a")
            .with("https://shop.test/p2", "b");

        let listings = collect_listings(&FakeSite::new("implicit"), &fetcher).await;
        assert_eq!(names(&listings), vec!["a", "b"]);
        assert_eq!(fetcher.requests().last().unwrap(), "https://shop.test/p3");
    }

    #[tokio::test]
    async fn implicit_pages_stop_at_empty_page() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/p1", "a")
            .with("https://shop.test/p2", "")
            .with("https://shop.test/p3", "c");

        let listings = collect_listings(&FakeSite::new("implicit"), &fetcher).await;
        assert_eq!(names(&listings), vec!["a"]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn detail_failure_keeps_list_fields() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/p1", "a,b")
            .with("https://shop.test/item/a", "12000");
        let site = FakeSite {
            signal_kind: "single",
            details: true,
        };

        let listings = collect_listings(&site, &fetcher).await;

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].btu, Some(12_000));
        assert_eq!(listings[1].name, "b");
        assert_eq!(listings[1].url, "https://shop.test/item/b");
        assert!(listings[1].btu.is_none());
        assert_eq!(
            fetcher.requests(),
            vec![
                "https://shop.test/p1",
                "https://shop.test/item/a",
                "https://shop.test/item/b"
            ]
        );
    }

    #[tokio::test]
    async fn detail_pass_counts_pages_without_fields() {
        let fetcher = MapFetcher::default()
            .with("https://shop.test/item/a", "9000")
            .with("https://shop.test/item/b", "no capacity here");
        let site = FakeSite {
            signal_kind: "single",
            details: true,
        };
        let mut listings: Vec<ListingRecord> = ["a", "b", "c"]
            .into_iter()
            .filter_map(|n| {
                ListingRecord::new(n, &format!("https://shop.test/item/{n}"), Retailer::Gree)
            })
            .collect();

        let pass = fill_from_detail_pages(&site, &fetcher, &mut listings).await;

        assert_eq!(
            pass,
            DetailPass {
                total: 3,
                failed: 1,
                empty: 1,
            }
        );
        assert_eq!(listings[0].btu, Some(9000));
        assert_eq!(listings[1].name, "b");
        assert!(listings[1].btu.is_none());
    }
}
