//! Remote job status tokens.

use std::fmt;

/// Status of a remote job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    /// Accepted, waiting for a worker.
    Queued,
    /// Being processed.
    Running,
    /// Completed; the result document is retrievable.
    Finished,
    /// The job failed, or its status could not be fetched.
    Error,
    /// The service no longer knows the job id.
    NotFound,
    /// The service rejected or abandoned the job.
    Failure,
}

impl RemoteStatus {
    /// Parse a service status token. Unknown tokens map to `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "QUEUED" => Some(RemoteStatus::Queued),
            "RUNNING" => Some(RemoteStatus::Running),
            "FINISHED" => Some(RemoteStatus::Finished),
            "ERROR" => Some(RemoteStatus::Error),
            "NOT_FOUND" => Some(RemoteStatus::NotFound),
            "FAILURE" => Some(RemoteStatus::Failure),
            _ => None,
        }
    }

    /// True when the job will never change status again.
    ///
    /// [`RemoteStatus::Finished`] is the only terminal status with a
    /// retrievable result.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteStatus::Queued | RemoteStatus::Running)
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            RemoteStatus::Queued => "QUEUED",
            RemoteStatus::Running => "RUNNING",
            RemoteStatus::Finished => "FINISHED",
            RemoteStatus::Error => "ERROR",
            RemoteStatus::NotFound => "NOT_FOUND",
            RemoteStatus::Failure => "FAILURE",
        };
        write!(f, "{}", token)
    }
}
