//! Active window bookkeeping.

use std::time::Instant;

use crate::client::JobId;

/// A submitted job occupying a window slot.
#[derive(Debug, Clone)]
pub struct ActiveJob {
    /// Service-assigned identifier.
    pub job_id: JobId,
    /// Display name of the originating sequence.
    pub name: String,
    /// Residue count of the submitted sequence.
    pub sequence_length: usize,
    /// When the job entered the window. Drives the optional per-job
    /// deadline.
    pub submitted_at: Instant,
}

impl ActiveJob {
    /// Record a freshly submitted job.
    pub fn new(job_id: JobId, name: impl Into<String>, sequence_length: usize) -> Self {
        Self {
            job_id,
            name: name.into(),
            sequence_length,
            submitted_at: Instant::now(),
        }
    }
}
