//! Windowed batch scheduling.
//!
//! [`ScanScheduler`] drives a whole batch through the remote service:
//! admission through the process gate, windowed submission, periodic
//! status sweeps, result retrieval, and index-aligned assembly. The run
//! is a single async state machine; delays and waits are awaited, never
//! slept on a thread, and every wait point honors the cancellation
//! token.

mod config;
mod job;
mod progress;
mod run;

pub use config::{
    SchedulerConfig, DEFAULT_MAX_CONCURRENT_JOBS, DEFAULT_POLL_DELAY, DEFAULT_SUBMIT_DELAY,
};
pub use job::ActiveJob;
pub use progress::{NullProgress, ProgressSink, TracingProgress};
pub use run::ScanScheduler;
