//! Background job scheduler.
//!
//! Registers the recurring scrape cycle and starts the [`JobScheduler`].

use std::sync::Arc;

use acdb_pipeline::{CycleCoordinator, CycleOutcome};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler. The returned handle must be kept alive
/// for the lifetime of the process; dropping it stops the jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `cron` does not parse, or the scheduler fails to start.
pub async fn build_scheduler(
    coordinator: Arc<CycleCoordinator>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_scrape_job(&scheduler, coordinator, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_scrape_job(
    scheduler: &JobScheduler,
    coordinator: Arc<CycleCoordinator>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let coordinator = Arc::clone(&coordinator);
        Box::pin(async move {
            tracing::info!("scheduler: starting scrape cycle");
            match coordinator.run_cycle().await {
                CycleOutcome::AlreadyRunning => {
                    tracing::info!("scheduler: previous cycle still running; skipped");
                }
                CycleOutcome::Completed(reports) => {
                    let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
                    tracing::info!(
                        retailers = reports.len(),
                        failed,
                        "scheduler: scrape cycle complete"
                    );
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: scrape job registered");
    Ok(())
}
