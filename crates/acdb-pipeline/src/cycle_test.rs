use std::collections::HashMap;
use std::time::Duration;

use acdb_core::ListingRecord;
use acdb_db::{DbError, MemoryListingStore, StoredListing};
use acdb_scraper::{ListPage, PaginationSignal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Notify, Semaphore};

use super::*;

/// Catalog where each line of the page is `name|url`. A page reading
/// `PANIC` makes the extractor panic.
struct LineSite {
    retailer: Retailer,
}

impl LineSite {
    fn arc(retailer: Retailer) -> Arc<dyn SiteExtractor> {
        Arc::new(Self { retailer })
    }
}

impl SiteExtractor for LineSite {
    fn retailer(&self) -> Retailer {
        self.retailer
    }

    fn entry_url(&self) -> String {
        format!("http://{}.test/", self.retailer)
    }

    fn parse_list_page(&self, html: &str) -> ListPage {
        assert!(html != "PANIC", "markup exploded");
        let listings = html
            .lines()
            .filter_map(|line| {
                let (name, url) = line.split_once('|')?;
                ListingRecord::new(name, url, self.retailer)
            })
            .collect();
        ListPage {
            listings,
            signal: PaginationSignal::Single,
        }
    }
}

/// Serves fixed pages; when gated, every fetch first waits for a permit.
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Notify>,
}

impl StubFetcher {
    fn with_page(mut self, retailer: Retailer, body: &str) -> Self {
        self.pages
            .insert(format!("http://{retailer}.test/"), body.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str, _timeout: Option<Duration>) -> Option<String> {
        if let Some(gate) = &self.gate {
            self.entered.notify_one();
            let _permit = gate.acquire().await.ok()?;
        }
        self.pages.get(url).cloned()
    }
}

/// Memory store that refuses every write for one retailer.
struct RefusingStore {
    inner: MemoryListingStore,
    refuse: Retailer,
}

impl RefusingStore {
    fn guard(&self, retailer: Retailer) -> Result<(), DbError> {
        if retailer == self.refuse {
            Err(DbError::Sqlx(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ListingStore for RefusingStore {
    async fn snapshot_hash(&self, retailer: Retailer) -> Result<Option<String>, DbError> {
        self.inner.snapshot_hash(retailer).await
    }

    async fn clear_retailer_listings(&self, retailer: Retailer) -> Result<u64, DbError> {
        self.guard(retailer)?;
        self.inner.clear_retailer_listings(retailer).await
    }

    async fn put_snapshot_metadata(
        &self,
        retailer: Retailer,
        content_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.guard(retailer)?;
        self.inner
            .put_snapshot_metadata(retailer, content_hash, updated_at)
            .await
    }

    async fn upsert_retailer_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError> {
        self.guard(retailer)?;
        self.inner.upsert_retailer_listings(retailer, listings).await
    }

    async fn clear_combined_source(&self, retailer: Retailer) -> Result<u64, DbError> {
        self.guard(retailer)?;
        self.inner.clear_combined_source(retailer).await
    }

    async fn upsert_combined_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError> {
        self.guard(retailer)?;
        self.inner.upsert_combined_listings(retailer, listings).await
    }
}

fn coordinator(
    retailers: &[Retailer],
    fetcher: StubFetcher,
    store: Arc<dyn ListingStore>,
) -> CycleCoordinator {
    CycleCoordinator::with_extractors(
        retailers.iter().copied().map(LineSite::arc).collect(),
        Arc::new(fetcher),
        store,
        StatusChannel::new(),
    )
}

#[tokio::test]
async fn cycle_reconciles_every_retailer() {
    let store = Arc::new(MemoryListingStore::new());
    let fetcher = StubFetcher::default()
        .with_page(Retailer::Jara, "J1|https://jara/1\nJ2|https://jara/2")
        .with_page(Retailer::Gree, "G1|https://gree/1");
    let coord = coordinator(&[Retailer::Jara, Retailer::Gree], fetcher, store.clone());

    let CycleOutcome::Completed(reports) = coord.run_cycle().await else {
        panic!("cycle should run");
    };

    let summary: Vec<(Retailer, usize)> = reports.iter().map(|r| (r.retailer, r.scraped)).collect();
    assert_eq!(summary, vec![(Retailer::Gree, 1), (Retailer::Jara, 2)]);
    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, Ok(ReconcileOutcome::Replaced { .. }))));
    assert_eq!(store.combined_listings().await.len(), 3);
    assert!(coord.status().current().starts_with("Scrape cycle finished"));
    assert!(!coord.is_running());
}

#[tokio::test]
async fn unreachable_retailer_keeps_its_snapshot() {
    let store = Arc::new(MemoryListingStore::new());
    let first = coordinator(
        &[Retailer::Gree],
        StubFetcher::default().with_page(Retailer::Gree, "G1|https://gree/1"),
        store.clone(),
    );
    first.run_cycle().await;

    let second = coordinator(&[Retailer::Gree], StubFetcher::default(), store.clone());
    let CycleOutcome::Completed(reports) = second.run_cycle().await else {
        panic!("cycle should run");
    };

    assert!(matches!(
        reports[0].outcome,
        Ok(ReconcileOutcome::SkippedEmpty)
    ));
    assert_eq!(store.retailer_listings(Retailer::Gree).await.len(), 1);
}

#[tokio::test]
async fn store_failure_is_isolated_to_its_retailer() {
    let store = Arc::new(RefusingStore {
        inner: MemoryListingStore::new(),
        refuse: Retailer::Jara,
    });
    let fetcher = StubFetcher::default()
        .with_page(Retailer::Jara, "J1|https://jara/1")
        .with_page(Retailer::Gree, "G1|https://gree/1");
    let coord = coordinator(&[Retailer::Gree, Retailer::Jara], fetcher, store.clone());

    let CycleOutcome::Completed(reports) = coord.run_cycle().await else {
        panic!("cycle should run");
    };

    assert!(reports[0].outcome.is_ok());
    let Err(PipelineError::Reconcile(err)) = &reports[1].outcome else {
        panic!("jara should fail: {:?}", reports[1].outcome);
    };
    assert_eq!(err.retailer(), Retailer::Jara);
    assert_eq!(store.inner.retailer_listings(Retailer::Gree).await.len(), 1);
}

#[tokio::test]
async fn panicking_retailer_is_reported_and_guard_released() {
    let store = Arc::new(MemoryListingStore::new());
    let fetcher = StubFetcher::default()
        .with_page(Retailer::Termocontrol, "PANIC")
        .with_page(Retailer::Gree, "G1|https://gree/1");
    let coord = coordinator(&[Retailer::Gree, Retailer::Termocontrol], fetcher, store);

    let CycleOutcome::Completed(reports) = coord.run_cycle().await else {
        panic!("cycle should run");
    };

    assert!(reports[0].outcome.is_ok());
    assert!(matches!(
        reports[1].outcome,
        Err(PipelineError::TaskFailed {
            retailer: Retailer::Termocontrol,
            ..
        })
    ));
    assert!(!coord.is_running());
}

#[tokio::test]
async fn second_trigger_while_running_is_dropped() {
    let gate = Arc::new(Semaphore::new(0));
    let entered = Arc::new(Notify::new());
    let fetcher = StubFetcher {
        gate: Some(gate.clone()),
        entered: entered.clone(),
        ..StubFetcher::default()
    }
    .with_page(Retailer::Gree, "G1|https://gree/1");
    let coord = Arc::new(coordinator(
        &[Retailer::Gree],
        fetcher,
        Arc::new(MemoryListingStore::new()),
    ));

    assert!(coord.spawn_cycle());
    entered.notified().await;
    assert!(coord.is_running());

    assert!(matches!(coord.run_cycle().await, CycleOutcome::AlreadyRunning));
    assert!(!coord.spawn_cycle());

    gate.add_permits(1);
    tokio::time::timeout(Duration::from_secs(5), async {
        while coord.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("cycle should finish once the fetch is released");

    gate.add_permits(8);
    assert!(matches!(coord.run_cycle().await, CycleOutcome::Completed(_)));
}

#[tokio::test]
async fn run_retailer_targets_one_extractor() {
    let store = Arc::new(MemoryListingStore::new());
    let fetcher = StubFetcher::default()
        .with_page(Retailer::Jara, "J1|https://jara/1")
        .with_page(Retailer::Gree, "G1|https://gree/1");
    let coord = coordinator(&[Retailer::Gree, Retailer::Jara], fetcher, store.clone());

    let report = coord.run_retailer(Retailer::Jara).await.unwrap();
    assert_eq!(report.scraped, 1);
    assert!(store.retailer_listings(Retailer::Gree).await.is_empty());
    assert!(coord.run_retailer(Retailer::Eurosanteh).await.is_none());
}
