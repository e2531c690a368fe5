//! Batch progress reporting.

use tracing::info;

/// Receives human-readable progress while a batch runs.
///
/// For a batch of N sequences the scheduler emits exactly 3N + 1 subtask
/// messages: one initial waiting message, then three per sequence
/// whichever path it takes (submitted and retrieved, submitted and
/// failed, or skipped at submission).
pub trait ProgressSink: Send + Sync {
    /// Report the subtask the batch is working on.
    fn subtask(&self, message: &str);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn subtask(&self, _message: &str) {}
}

/// Forwards progress to the tracing log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn subtask(&self, message: &str) {
        info!("{}", message);
    }
}
