//! Batch-level error taxonomy.

use thiserror::Error;

/// Failures that abort a whole batch run.
///
/// Per-sequence problems (submission failures, failed remote jobs,
/// unusable result documents) never surface here; the scheduler absorbs
/// them into empty or placeholder per-sequence results. A batch run only
/// fails as a whole when it is cancelled or an internal invariant breaks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The run was cancelled while waiting for admission or in flight.
    #[error("scan cancelled")]
    Cancelled,

    /// An internal invariant broke. Indicates a bug, not a service problem.
    #[error("internal scan failure: {0}")]
    Internal(String),
}
