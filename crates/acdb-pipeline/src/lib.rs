//! Scrape-cycle orchestration: content fingerprinting, snapshot
//! reconciliation, the status channel and the cycle coordinator.

pub mod cycle;
pub mod fingerprint;
pub mod reconcile;
pub mod status;

pub use cycle::{CycleCoordinator, CycleOutcome, PipelineError, RetailerReport};
pub use fingerprint::content_hash;
pub use reconcile::{reconcile, ReconcileError, ReconcileOutcome, ReconcilePhase};
pub use status::StatusChannel;
