//! Full scrape cycle: every retailer concurrently, at most one cycle at a
//! time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use acdb_core::Retailer;
use acdb_db::ListingStore;
use acdb_scraper::{all_extractors, collect_listings, PageFetcher, SiteExtractor};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::reconcile::{reconcile, ReconcileError, ReconcileOutcome};
use crate::status::StatusChannel;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("{retailer}: pipeline task failed: {message}")]
    TaskFailed { retailer: Retailer, message: String },
}

/// Result of one retailer's scrape and reconcile.
#[derive(Debug)]
pub struct RetailerReport {
    pub retailer: Retailer,
    /// Listings collected before reconciliation.
    pub scraped: usize,
    pub outcome: Result<ReconcileOutcome, PipelineError>,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// Another cycle held the guard; nothing ran.
    AlreadyRunning,
    /// Reports in retailer order.
    Completed(Vec<RetailerReport>),
}

/// Clears the in-flight flag when the cycle ends, including by panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CycleCoordinator {
    extractors: Vec<Arc<dyn SiteExtractor>>,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn ListingStore>,
    status: StatusChannel,
    running: AtomicBool,
}

impl CycleCoordinator {
    /// Coordinator over all six retailers.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ListingStore>,
        status: StatusChannel,
    ) -> Self {
        let extractors = all_extractors().into_iter().map(Arc::from).collect();
        Self::with_extractors(extractors, fetcher, store, status)
    }

    #[must_use]
    pub fn with_extractors(
        extractors: Vec<Arc<dyn SiteExtractor>>,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ListingStore>,
        status: StatusChannel,
    ) -> Self {
        Self {
            extractors,
            fetcher,
            store,
            status,
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn status(&self) -> &StatusChannel {
        &self.status
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard(&self.running))
    }

    /// Runs one full cycle and waits for every retailer to finish.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.try_acquire() else {
            tracing::warn!("cycle: already running; skipping trigger");
            return CycleOutcome::AlreadyRunning;
        };
        CycleOutcome::Completed(self.run_all().await)
    }

    /// Starts a cycle on a background task. Returns `false` without spawning
    /// when a cycle is already in flight.
    pub fn spawn_cycle(self: &Arc<Self>) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("cycle: already running; skipping trigger");
            return false;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = RunningGuard(&this.running);
            this.run_all().await;
        });
        true
    }

    /// Runs a single retailer's pipeline outside the cycle guard. `None`
    /// when the coordinator has no extractor for `retailer`.
    pub async fn run_retailer(&self, retailer: Retailer) -> Option<RetailerReport> {
        let extractor = self.extractors.iter().find(|e| e.retailer() == retailer)?;
        Some(
            run_pipeline(
                extractor.as_ref(),
                self.fetcher.as_ref(),
                self.store.as_ref(),
                &self.status,
            )
            .await,
        )
    }

    async fn run_all(&self) -> Vec<RetailerReport> {
        self.status.cycle_started();

        let mut tasks = JoinSet::new();
        let mut task_retailers = HashMap::with_capacity(self.extractors.len());
        for extractor in &self.extractors {
            let extractor = Arc::clone(extractor);
            let fetcher = Arc::clone(&self.fetcher);
            let store = Arc::clone(&self.store);
            let status = self.status.clone();
            let retailer = extractor.retailer();
            let handle = tasks.spawn(async move {
                run_pipeline(extractor.as_ref(), fetcher.as_ref(), store.as_ref(), &status).await
            });
            task_retailers.insert(handle.id(), retailer);
        }

        let mut reports = Vec::with_capacity(self.extractors.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, report)) => reports.push(report),
                Err(e) => {
                    let Some(&retailer) = task_retailers.get(&e.id()) else {
                        tracing::error!(error = %e, "cycle: unknown task failed");
                        continue;
                    };
                    tracing::error!(%retailer, error = %e, "cycle: retailer task failed");
                    let error = PipelineError::TaskFailed {
                        retailer,
                        message: e.to_string(),
                    };
                    self.status.retailer_failed(retailer, &error);
                    reports.push(RetailerReport {
                        retailer,
                        scraped: 0,
                        outcome: Err(error),
                    });
                }
            }
        }
        reports.sort_by_key(|r| r.retailer);

        let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
        if failed > 0 {
            tracing::warn!(failed, total = reports.len(), "cycle: some retailers failed");
        }
        self.status.cycle_finished();
        reports
    }
}

/// Scrape, then reconcile, one retailer. Failures are logged, published on
/// the status channel and returned in the report.
async fn run_pipeline(
    extractor: &dyn SiteExtractor,
    fetcher: &dyn PageFetcher,
    store: &dyn ListingStore,
    status: &StatusChannel,
) -> RetailerReport {
    let retailer = extractor.retailer();
    status.retailer_started(retailer);

    let listings = collect_listings(extractor, fetcher).await;
    let scraped = listings.len();

    let outcome = reconcile(store, retailer, listings).await;
    match &outcome {
        Ok(ReconcileOutcome::SkippedEmpty) => status.retailer_no_data(retailer),
        Ok(_) => status.retailer_finished(retailer),
        Err(e) => {
            tracing::error!(%retailer, error = %e, "cycle: reconcile failed");
            status.retailer_failed(retailer, e);
        }
    }

    RetailerReport {
        retailer,
        scraped,
        outcome: outcome.map_err(PipelineError::from),
    }
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod tests;
