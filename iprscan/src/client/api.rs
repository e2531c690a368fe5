//! Job service abstraction.

use std::fmt;
use std::future::Future;

use thiserror::Error;

use crate::client::status::RemoteStatus;
use crate::config::ScanOptions;

/// Identifier assigned by the remote service to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Wrap a service-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text, for URLs and log messages.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors from the remote job client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: connect, timeout, or an HTTP error status.
    #[error("request failed: {0}")]
    Http(String),

    /// The service answered the submission with an empty body.
    #[error("service returned an empty job id")]
    EmptySubmission,

    /// The result document could not be persisted or read back.
    #[error("result persistence failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Client operations against an InterProScan-style job dispatcher.
///
/// Implementations are shared by reference across a whole scheduler run.
/// No operation retries internally: a failed attempt is the outcome for
/// that cycle. [`JobApi::status`] deliberately never errors, either:
/// transport problems surface as [`RemoteStatus::Error`], which is a
/// terminal answer like any other abnormal status.
pub trait JobApi: Send + Sync {
    /// Submit one sequence for analysis, returning the service job id.
    ///
    /// A transport failure or an empty response body is a submission
    /// failure; the caller decides how to degrade.
    fn submit(
        &self,
        sequence: &str,
        options: &ScanOptions,
    ) -> impl Future<Output = Result<JobId, ClientError>> + Send;

    /// Poll the current status of a submitted job.
    fn status(&self, job: &JobId) -> impl Future<Output = RemoteStatus> + Send;

    /// Download the result document for a finished job in the given
    /// format.
    fn fetch_result(
        &self,
        job: &JobId,
        format: &str,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_display_matches_inner() {
        let id = JobId::new("iprscan5-R20260826-123456-0800-12345678-p1m");
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn test_client_error_messages() {
        assert_eq!(
            ClientError::EmptySubmission.to_string(),
            "service returned an empty job id"
        );
        assert_eq!(
            ClientError::Http("timed out".into()).to_string(),
            "request failed: timed out"
        );
    }
}
