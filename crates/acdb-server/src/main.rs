mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use acdb_core::{AppConfig, Retailer};
use acdb_db::{PgListingStore, PoolConfig};
use acdb_pipeline::{CycleCoordinator, StatusChannel};
use acdb_scraper::HttpFetcher;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = acdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = connect_with_retry(&config).await?;
    acdb_db::run_migrations(&pool).await?;

    let fetcher = HttpFetcher::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
    )?;
    let coordinator = Arc::new(CycleCoordinator::new(
        Arc::new(fetcher),
        Arc::new(PgListingStore::new(pool.clone())),
        StatusChannel::new(),
    ));

    if config.scrape_on_startup {
        bootstrap_missing_snapshots(&coordinator).await;
    }

    let _scheduler = scheduler::build_scheduler(Arc::clone(&coordinator), &config.scrape_cron).await?;

    let app = build_app(AppState {
        pool,
        coordinator,
        status_push_interval: Duration::from_secs(config.status_push_interval_secs),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// The database may come up after the service does; give it a few tries.
async fn connect_with_retry(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let pool_config = PoolConfig::from_app_config(config);
    let mut attempt = 1;
    loop {
        let result = match acdb_db::connect_pool(&config.database_url, pool_config).await {
            Ok(pool) => acdb_db::ping(&pool).await.map(|()| pool),
            Err(e) => Err(e),
        };
        match result {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "database not reachable yet; retrying");
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Starts a background cycle when any retailer has never been scraped.
async fn bootstrap_missing_snapshots(coordinator: &Arc<CycleCoordinator>) {
    let mut missing = Vec::new();
    for retailer in Retailer::ALL {
        match coordinator.store().snapshot_hash(retailer).await {
            Ok(Some(_)) => {}
            Ok(None) => missing.push(retailer),
            Err(e) => {
                tracing::warn!(%retailer, error = %e, "startup: could not read snapshot metadata");
                missing.push(retailer);
            }
        }
    }

    if missing.is_empty() {
        tracing::info!("startup: every retailer has a snapshot; waiting for the schedule");
        return;
    }
    tracing::info!(missing = ?missing, "startup: triggering initial scrape cycle");
    coordinator.spawn_cycle();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
