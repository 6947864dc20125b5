//! Human-readable scrape status shared with any number of observers.

use std::sync::Arc;

use acdb_core::Retailer;
use chrono::Utc;
use tokio::sync::watch;

const IDLE: &str = "Waiting for the first scrape cycle";

/// Latest status text. Cloning yields another handle to the same channel;
/// only the cycle coordinator publishes, everything else reads or
/// subscribes.
#[derive(Debug, Clone)]
pub struct StatusChannel {
    tx: Arc<watch::Sender<String>>,
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusChannel {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(IDLE.to_string());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Replaces the status text and logs it.
    pub fn publish(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(status = %text, "status");
        self.tx.send_replace(text);
    }

    pub(crate) fn cycle_started(&self) {
        self.publish(format!(
            "Scrape cycle started at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    pub(crate) fn cycle_finished(&self) {
        self.publish(format!(
            "Scrape cycle finished at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    pub(crate) fn retailer_started(&self, retailer: Retailer) {
        self.publish(format!("{retailer}: scraping started"));
    }

    pub(crate) fn retailer_finished(&self, retailer: Retailer) {
        self.publish(format!("{retailer}: scraping finished"));
    }

    pub(crate) fn retailer_no_data(&self, retailer: Retailer) {
        self.publish(format!("{retailer}: no new data"));
    }

    pub(crate) fn retailer_failed(&self, retailer: Retailer, error: &dyn std::fmt::Display) {
        self.publish(format!("{retailer}: error: {error}"));
    }
}
