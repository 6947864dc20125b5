//! `acdb collect`: one scrape cycle (or one retailer) run in the
//! foreground. Per-retailer failures are printed, not propagated.

use std::sync::Arc;

use acdb_core::{Retailer, ScraperConfig};
use acdb_db::{ListingStore, MemoryListingStore, PgListingStore};
use acdb_pipeline::{CycleCoordinator, CycleOutcome, ReconcileOutcome, RetailerReport, StatusChannel};
use acdb_scraper::HttpFetcher;

/// Picks the reconciliation target. Only the Postgres path reads the full
/// app config, so a dry run needs no `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the app config is invalid or the database is
/// unreachable or its migrations fail.
pub(crate) async fn open_store(dry_run: bool) -> anyhow::Result<Arc<dyn ListingStore>> {
    if dry_run {
        tracing::info!("dry run: reconciling into an in-memory store");
        return Ok(Arc::new(MemoryListingStore::new()));
    }
    let config = acdb_core::load_app_config()?;
    let pool = acdb_db::connect_pool(
        &config.database_url,
        acdb_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    acdb_db::run_migrations(&pool).await?;
    Ok(Arc::new(PgListingStore::new(pool)))
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub(crate) async fn run_collect(
    scraper: &ScraperConfig,
    store: Arc<dyn ListingStore>,
    retailer: Option<Retailer>,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(scraper.request_timeout_secs, &scraper.user_agent)?;
    let coordinator = CycleCoordinator::new(Arc::new(fetcher), store, StatusChannel::new());

    let reports = match retailer {
        Some(retailer) => coordinator.run_retailer(retailer).await.into_iter().collect(),
        None => match coordinator.run_cycle().await {
            CycleOutcome::Completed(reports) => reports,
            CycleOutcome::AlreadyRunning => Vec::new(),
        },
    };

    for report in &reports {
        println!("{}", describe(report));
    }
    let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
    println!("{} retailer(s) processed, {failed} failed", reports.len());
    Ok(())
}

pub(crate) fn describe(report: &RetailerReport) -> String {
    let outcome = match &report.outcome {
        Ok(ReconcileOutcome::SkippedEmpty) => "nothing scraped; snapshot kept".to_string(),
        Ok(ReconcileOutcome::Unchanged { .. }) => "unchanged".to_string(),
        Ok(ReconcileOutcome::Replaced {
            listings, combined, ..
        }) => format!("replaced ({listings} listings, {combined} combined)"),
        Err(e) => format!("failed: {e}"),
    };
    format!(
        "{:<14} scraped {:>4}  {outcome}",
        report.retailer, report.scraped
    )
}
