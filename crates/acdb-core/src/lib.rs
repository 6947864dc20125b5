mod app_config;
pub mod btu;
mod config;
pub mod listings;

pub use app_config::{AppConfig, Environment, ScraperConfig};
pub use btu::{calculate_btu, BtuRange, BtuRequest, BtuResult, CalcError, KwRange};
pub use config::{load_app_config, load_app_config_from_env, load_scraper_config};
pub use listings::{combined_key, DetailFields, ListingRecord, Retailer, DEFAULT_CURRENCY};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown retailer: {0}")]
    UnknownRetailer(String),
}
