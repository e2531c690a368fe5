//! Scheduler tuning.

use std::time::Duration;

/// Maximum number of jobs in flight per batch run. The service allows 30
/// concurrent jobs per user; staying at half leaves room for other
/// clients on the same account.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 15;

/// Pause between consecutive job submissions.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(250);

/// Pause between status sweeps over the active window.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(250);

/// Tuning for [`ScanScheduler`](crate::scheduler::ScanScheduler).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use iprscan::scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::default();
/// assert_eq!(config.max_concurrent_jobs(), 15);
/// assert_eq!(config.submit_delay(), Duration::from_millis(250));
/// assert_eq!(config.job_timeout(), None);
///
/// let config = SchedulerConfig::new()
///     .with_max_concurrent_jobs(4)
///     .with_job_timeout(Some(Duration::from_secs(1800)));
/// assert_eq!(config.max_concurrent_jobs(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    max_concurrent_jobs: usize,
    submit_delay: Duration,
    poll_delay: Duration,
    job_timeout: Option<Duration>,
}

impl SchedulerConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active window cap.
    ///
    /// The window must be able to admit at least one job, otherwise a
    /// batch could never drain; a cap of zero is raised to one.
    pub fn with_max_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.max_concurrent_jobs = jobs.max(1);
        self
    }

    /// Set the pause between consecutive submissions.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Set the pause between status sweeps.
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    /// Set an optional per-job deadline.
    ///
    /// A job still non-terminal past the deadline is treated as failed
    /// and its sequence records an empty result. `None`, the default,
    /// polls for as long as the service keeps reporting progress.
    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// The active window cap.
    pub fn max_concurrent_jobs(&self) -> usize {
        self.max_concurrent_jobs
    }

    /// Pause between consecutive submissions.
    pub fn submit_delay(&self) -> Duration {
        self.submit_delay
    }

    /// Pause between status sweeps.
    pub fn poll_delay(&self) -> Duration {
        self.poll_delay
    }

    /// Optional per-job deadline.
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            submit_delay: DEFAULT_SUBMIT_DELAY,
            poll_delay: DEFAULT_POLL_DELAY,
            job_timeout: None,
        }
    }
}
