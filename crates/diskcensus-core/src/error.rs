/// Error taxonomy for an inventory run.
///
/// Only process-invocation failures and an empty enumeration abort a run.
/// Parse degradation and attribute probe failures never surface here.
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The tool exceeded its allotted wait and was terminated.
    #[error("{tool} did not finish within {}s and was terminated", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    /// The tool (or its script/output files) could not be set up or supervised.
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The output sink was missing or unreadable after the tool exited.
    #[error("output capture for {tool} is missing: {source}")]
    Capture {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Enumeration ran but listed no disks, so there is nothing to detail.
    #[error("no disks detected")]
    NoDisksDetected,
}

/// Failures of the report writers. Kept apart from [`InventoryError`]:
/// writing happens after the run, from data already collected.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
