use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// The subset of settings a scrape needs; loadable without a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Default per-request timeout; retailers with a fixed timeout override it.
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Six-field cron expression (seconds first) for the full scrape cycle.
    pub scrape_cron: String,
    /// Trigger a cycle at startup when any retailer has never been scraped.
    pub scrape_on_startup: bool,
    pub status_push_interval_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scrape_cron", &self.scrape_cron)
            .field("scrape_on_startup", &self.scrape_on_startup)
            .field(
                "status_push_interval_secs",
                &self.status_push_interval_secs,
            )
            .finish()
    }
}
