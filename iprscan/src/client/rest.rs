//! REST client for the EBI job dispatcher.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::api::{ClientError, JobApi, JobId};
use crate::client::status::RemoteStatus;
use crate::config::ScanOptions;

/// Production endpoint of the EBI InterProScan dispatcher.
pub const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/Tools/services/rest/interproscan";

/// Result document format requested once a job finishes.
pub const RESULT_FORMAT_XML: &str = "xml";

/// Timeout applied to every HTTP request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// [`JobApi`] implementation backed by the EBI REST dispatcher.
///
/// Submission posts a form with the sequence, contact email, and the
/// GO-term/pathway switches. Status is a bare-token GET. Results are
/// spooled to a temporary file named after the job before being read
/// back, so the full document is on disk before parsing starts.
pub struct EbiClient {
    client: reqwest::Client,
    base_url: String,
}

impl EbiClient {
    /// Create a client against the production EBI endpoint.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against an alternate endpoint (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET the bare status token body for a job.
    async fn status_body(&self, job: &JobId) -> Result<String, ClientError> {
        let url = status_url(&self.base_url, job);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))
    }
}

impl JobApi for EbiClient {
    async fn submit(&self, sequence: &str, options: &ScanOptions) -> Result<JobId, ClientError> {
        let url = run_url(&self.base_url);
        let form = submit_form(sequence, options);
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let id = body.trim();
        if id.is_empty() {
            return Err(ClientError::EmptySubmission);
        }
        debug!(job_id = id, "job submitted");
        Ok(JobId::new(id))
    }

    async fn status(&self, job: &JobId) -> RemoteStatus {
        resolve_status(job, self.status_body(job).await)
    }

    async fn fetch_result(&self, job: &JobId, format: &str) -> Result<String, ClientError> {
        let url = result_url(&self.base_url, job, format);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let suffix = format!(".{}", format);
        let mut spool = tempfile::Builder::new()
            .prefix(job.as_str())
            .suffix(&suffix)
            .tempfile()?;
        spool.write_all(&body)?;
        spool.flush()?;
        let document = std::fs::read_to_string(spool.path())?;
        debug!(job_id = %job, bytes = body.len(), "result document retrieved");
        Ok(document)
    }
}

/// Map the outcome of a status request onto a job status.
///
/// A token outside the service vocabulary answers
/// [`RemoteStatus::Failure`]; failing to obtain a token at all answers
/// [`RemoteStatus::Error`]. Both are terminal, so one bad poll settles
/// the job.
fn resolve_status(job: &JobId, body: Result<String, ClientError>) -> RemoteStatus {
    match body {
        Ok(body) => {
            let token = body.trim();
            match RemoteStatus::from_token(token) {
                Some(status) => status,
                None => {
                    warn!(job_id = %job, token, "unrecognized status token");
                    RemoteStatus::Failure
                }
            }
        }
        Err(e) => {
            warn!(job_id = %job, error = %e, "status poll failed");
            RemoteStatus::Error
        }
    }
}

// ============================================================================
// Request construction
// ============================================================================

fn run_url(base: &str) -> String {
    format!("{}/run/", base)
}

fn status_url(base: &str, job: &JobId) -> String {
    format!("{}/status/{}", base, job)
}

fn result_url(base: &str, job: &JobId, format: &str) -> String {
    format!("{}/result/{}/{}", base, job, format)
}

/// Form fields for a submission.
///
/// Only the sequence, the contact email, and the GO-term/pathway switches
/// go over the wire; the dispatcher runs all applications when none are
/// named.
fn submit_form(sequence: &str, options: &ScanOptions) -> Vec<(&'static str, String)> {
    vec![
        ("sequence", sequence.to_string()),
        ("email", options.email().to_string()),
        ("goterms", switch(options.goterms()).to_string()),
        ("pathways", switch(options.pathways()).to_string()),
    ]
}

fn switch(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(form: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_run_url() {
        assert_eq!(
            run_url(DEFAULT_BASE_URL),
            "https://www.ebi.ac.uk/Tools/services/rest/interproscan/run/"
        );
    }

    #[test]
    fn test_status_url() {
        let job = JobId::new("iprscan5-R20260826-abc");
        assert_eq!(
            status_url(DEFAULT_BASE_URL, &job),
            "https://www.ebi.ac.uk/Tools/services/rest/interproscan/status/iprscan5-R20260826-abc"
        );
    }

    #[test]
    fn test_result_url() {
        let job = JobId::new("iprscan5-R20260826-abc");
        assert_eq!(
            result_url(DEFAULT_BASE_URL, &job, RESULT_FORMAT_XML),
            "https://www.ebi.ac.uk/Tools/services/rest/interproscan/result/iprscan5-R20260826-abc/xml"
        );
    }

    #[test]
    fn test_submit_form_fields() {
        let options = ScanOptions::new("someone@example.org");
        let form = submit_form("MKWV", &options);
        assert_eq!(field(&form, "sequence"), Some("MKWV"));
        assert_eq!(field(&form, "email"), Some("someone@example.org"));
        assert_eq!(field(&form, "goterms"), Some("off"));
        assert_eq!(field(&form, "pathways"), Some("off"));
        assert_eq!(form.len(), 4);
    }

    #[test]
    fn test_submit_form_switches_on() {
        let options = ScanOptions::new("someone@example.org")
            .with_goterms(true)
            .with_pathways(true);
        let form = submit_form("MKWV", &options);
        assert_eq!(field(&form, "goterms"), Some("on"));
        assert_eq!(field(&form, "pathways"), Some("on"));
    }

    #[test]
    fn test_applications_never_transmitted() {
        let options = ScanOptions::new("someone@example.org");
        let form = submit_form("MKWV", &options);
        assert!(form.iter().all(|(k, _)| *k != "appl"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = EbiClient::with_base_url("http://localhost:8080/iprscan/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/iprscan");
    }

    #[test]
    fn test_resolve_status_maps_service_tokens() {
        let job = JobId::new("iprscan5-R20260826-abc");
        assert_eq!(
            resolve_status(&job, Ok("RUNNING".to_string())),
            RemoteStatus::Running
        );
        assert_eq!(
            resolve_status(&job, Ok("  FINISHED\n".to_string())),
            RemoteStatus::Finished
        );
    }

    #[test]
    fn test_resolve_status_unknown_token_fails_the_job() {
        let job = JobId::new("iprscan5-R20260826-abc");
        assert_eq!(
            resolve_status(&job, Ok("PENDING".to_string())),
            RemoteStatus::Failure
        );
    }

    #[test]
    fn test_resolve_status_transport_problem_is_error() {
        let job = JobId::new("iprscan5-R20260826-abc");
        let outcome = resolve_status(&job, Err(ClientError::Http("connection refused".to_string())));
        assert_eq!(outcome, RemoteStatus::Error);
    }
}
