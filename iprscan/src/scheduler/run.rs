//! Batch scan engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::admission::{self, AdmissionQueue};
use crate::annotation::AnnotationSet;
use crate::client::{JobApi, RemoteStatus, RESULT_FORMAT_XML};
use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::parser::{annotate_document, annotate_failure, ResultDocument};
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::job::ActiveJob;
use crate::scheduler::progress::{NullProgress, ProgressSink};
use crate::sequence::SequenceRecord;

/// Windowed batch scheduler over a [`JobApi`] implementation.
///
/// Submissions walk the batch in input order, at most
/// [`SchedulerConfig::max_concurrent_jobs`] jobs in flight, with a pause
/// between submissions and between status sweeps. Results land in the
/// output at the originating sequence's index no matter the completion
/// order. Per-sequence failures degrade to empty or placeholder slots;
/// only cancellation and internal faults fail the run as a whole.
pub struct ScanScheduler<C: JobApi> {
    client: C,
    options: ScanOptions,
    config: SchedulerConfig,
    gate: AdmissionQueue,
    progress: Arc<dyn ProgressSink>,
}

impl<C: JobApi> ScanScheduler<C> {
    /// Create a scheduler with default tuning, the process-wide
    /// admission gate, and no progress reporting.
    pub fn new(client: C, options: ScanOptions) -> Self {
        Self {
            client,
            options,
            config: SchedulerConfig::default(),
            gate: admission::process_gate(),
            progress: Arc::new(NullProgress),
        }
    }

    /// Replace the scheduler tuning.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Substitute an admission queue, detaching from the process gate.
    pub fn with_gate(mut self, gate: AdmissionQueue) -> Self {
        self.gate = gate;
        self
    }

    /// Attach a progress sink.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Run a whole batch to completion.
    ///
    /// The returned vector is index-aligned with `items`: slot `i` holds
    /// the annotations for `items[i]`. An empty batch returns
    /// immediately without queueing for admission.
    ///
    /// # Errors
    ///
    /// [`ScanError::Cancelled`] when the token fires while queued or in
    /// flight; [`ScanError::Internal`] if result assembly finds a hole,
    /// which would be a bug.
    pub async fn run(
        &self,
        items: &[SequenceRecord],
        cancel: &CancellationToken,
    ) -> Result<Vec<AnnotationSet>, ScanError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        self.progress.subtask("Waiting to execute...");
        let _ticket = self.gate.enter(cancel).await?;
        info!(batch = items.len(), "batch admitted");
        let slots = self.drive(items, cancel).await?;
        assemble(items.len(), slots)
    }

    /// The fill-and-sweep loop. Runs with the admission ticket held.
    async fn drive(
        &self,
        items: &[SequenceRecord],
        cancel: &CancellationToken,
    ) -> Result<HashMap<usize, AnnotationSet>, ScanError> {
        let mut slots: HashMap<usize, AnnotationSet> = HashMap::with_capacity(items.len());
        let mut active: HashMap<usize, ActiveJob> = HashMap::new();
        let mut next_index = 0usize;

        loop {
            while active.len() < self.config.max_concurrent_jobs() && next_index < items.len() {
                self.submit_next(next_index, &items[next_index], &mut active, &mut slots)
                    .await;
                next_index += 1;
                self.pause(self.config.submit_delay(), cancel).await?;
            }

            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            self.sweep(&mut active, &mut slots).await;

            if active.is_empty() && next_index == items.len() {
                break;
            }
            self.pause(self.config.poll_delay(), cancel).await?;
        }
        Ok(slots)
    }

    /// Submit one sequence. A failed submission records an empty slot
    /// right away and never occupies the window.
    async fn submit_next(
        &self,
        index: usize,
        item: &SequenceRecord,
        active: &mut HashMap<usize, ActiveJob>,
        slots: &mut HashMap<usize, AnnotationSet>,
    ) {
        self.progress
            .subtask(&format!("Submitting job for {}", item.name()));
        match self.client.submit(item.residues(), &self.options).await {
            Ok(job_id) => {
                info!(sequence = item.name(), job_id = %job_id, "job submitted");
                self.progress
                    .subtask(&format!("{} submitted, awaiting results.", item.name()));
                active.insert(index, ActiveJob::new(job_id, item.name(), item.len()));
            }
            Err(e) => {
                error!(sequence = item.name(), error = %e, "job submission failed");
                self.progress
                    .subtask(&format!("{} had a submission error.", item.name()));
                self.progress.subtask(&format!("{} skipped.", item.name()));
                slots.insert(index, AnnotationSet::default());
            }
        }
    }

    /// Poll every active job once, retiring the terminal ones.
    async fn sweep(
        &self,
        active: &mut HashMap<usize, ActiveJob>,
        slots: &mut HashMap<usize, AnnotationSet>,
    ) {
        let mut retired: Vec<usize> = Vec::new();
        for (&index, job) in active.iter() {
            match self.poll_status(job).await {
                RemoteStatus::Queued | RemoteStatus::Running => {}
                RemoteStatus::Finished => {
                    self.progress
                        .subtask(&format!("Getting results for {}", job.name));
                    slots.insert(index, self.retrieve(job).await);
                    retired.push(index);
                }
                status => {
                    error!(
                        sequence = %job.name,
                        job_id = %job.job_id,
                        status = %status,
                        "remote job failed"
                    );
                    self.progress.subtask(&format!(
                        "An error occurred with {}[{}]. Status: {}",
                        job.name, job.job_id, status
                    ));
                    slots.insert(index, AnnotationSet::default());
                    retired.push(index);
                }
            }
        }
        for index in retired {
            active.remove(&index);
        }
    }

    /// One status poll, with the optional per-job deadline applied to
    /// non-terminal answers.
    async fn poll_status(&self, job: &ActiveJob) -> RemoteStatus {
        let status = self.client.status(&job.job_id).await;
        if status.is_terminal() {
            return status;
        }
        match self.config.job_timeout() {
            Some(limit) if job.submitted_at.elapsed() > limit => {
                warn!(
                    job_id = %job.job_id,
                    elapsed_secs = job.submitted_at.elapsed().as_secs(),
                    "job exceeded deadline"
                );
                RemoteStatus::Failure
            }
            _ => status,
        }
    }

    /// Fetch and annotate one finished job. Download and parse problems
    /// degrade to the failure placeholder, never to a batch error.
    async fn retrieve(&self, job: &ActiveJob) -> AnnotationSet {
        let document = match self.client.fetch_result(&job.job_id, RESULT_FORMAT_XML).await {
            Ok(xml) => match ResultDocument::parse(&xml) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    error!(job_id = %job.job_id, error = %e, "result document unusable");
                    None
                }
            },
            Err(e) => {
                error!(job_id = %job.job_id, error = %e, "result download failed");
                None
            }
        };
        match document {
            Some(doc) => {
                debug!(job_id = %job.job_id, matches = doc.matches.len(), "result parsed");
                annotate_document(
                    &doc,
                    job.sequence_length,
                    self.options.feature_mode(),
                    self.options.extra_features(),
                )
            }
            None => annotate_failure(job.sequence_length, self.options.extra_features()),
        }
    }

    /// Sleep that returns early with [`ScanError::Cancelled`] when the
    /// token fires.
    async fn pause(&self, delay: Duration, cancel: &CancellationToken) -> Result<(), ScanError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

/// Order the recorded slots by input index.
fn assemble(
    count: usize,
    mut slots: HashMap<usize, AnnotationSet>,
) -> Result<Vec<AnnotationSet>, ScanError> {
    let mut results = Vec::with_capacity(count);
    for index in 0..count {
        let set = slots.remove(&index).ok_or_else(|| {
            ScanError::Internal(format!("no result recorded for sequence {}", index))
        })?;
        results.push(set);
    }
    Ok(results)
}
