//! Integration tests for the batch scan scheduler.
//!
//! These tests drive [`iprscan::scheduler::ScanScheduler`] against a
//! scripted service double and verify:
//! - Results stay aligned with input order regardless of completion order
//! - The in-flight window never exceeds its cap
//! - Per-sequence failures degrade to empty or placeholder slots without
//!   failing the run
//! - Progress reporting emits the fixed per-sequence message budget
//! - Cancellation aborts promptly and releases the admission gate
//! - Concurrent batches are serialized by a shared admission gate

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use iprscan::admission::AdmissionQueue;
use iprscan::client::{ClientError, JobApi, JobId, RemoteStatus};
use iprscan::config::ScanOptions;
use iprscan::error::ScanError;
use iprscan::parser::{INTERPRO_TERM_CATEGORY, SCAN_ERROR_NAME};
use iprscan::scheduler::{ProgressSink, ScanScheduler, SchedulerConfig};
use iprscan::sequence::SequenceRecord;

// =============================================================================
// Test Helpers
// =============================================================================

const NARH_XML: &str = include_str!("data/narh.xml");

/// Scripted behavior for [`ScriptedApi`].
///
/// Jobs are identified by submission order, which the scheduler
/// guarantees equals input order; `fail_submissions`, `fail_status`,
/// and `fail_fetch` are keyed by that index.
#[derive(Default)]
struct ApiSpec {
    /// Status polls a job answers `RUNNING` before completing.
    polls_to_finish: u32,
    fail_submissions: HashSet<usize>,
    fail_status: HashMap<usize, RemoteStatus>,
    fail_fetch: HashSet<usize>,
    /// Result document served for every job; per-job single-match
    /// documents when unset.
    result_xml: Option<&'static str>,
    /// Prefix for entries in the shared event log.
    tag: &'static str,
    events: Option<Arc<Mutex<Vec<String>>>>,
}

#[derive(Default)]
struct ApiState {
    submissions: usize,
    polls: HashMap<String, u32>,
    live: HashSet<String>,
    max_live: usize,
}

/// Service double with scripted outcomes and in-flight accounting.
#[derive(Clone)]
struct ScriptedApi {
    inner: Arc<ApiInner>,
}

struct ApiInner {
    spec: ApiSpec,
    state: Mutex<ApiState>,
}

impl ScriptedApi {
    fn new(spec: ApiSpec) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                spec,
                state: Mutex::new(ApiState::default()),
            }),
        }
    }

    fn submissions(&self) -> usize {
        self.inner.state.lock().unwrap().submissions
    }

    /// Highest number of jobs simultaneously accepted and not yet
    /// terminal.
    fn max_live(&self) -> usize {
        self.inner.state.lock().unwrap().max_live
    }

    fn record(&self, event: &str) {
        if let Some(events) = &self.inner.spec.events {
            events
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.inner.spec.tag, event));
        }
    }
}

impl JobApi for ScriptedApi {
    async fn submit(&self, _sequence: &str, _options: &ScanOptions) -> Result<JobId, ClientError> {
        let index;
        {
            let mut state = self.inner.state.lock().unwrap();
            index = state.submissions;
            state.submissions += 1;
            if self.inner.spec.fail_submissions.contains(&index) {
                return Err(ClientError::Http("scripted submission failure".to_string()));
            }
            let id = format!("job-{}", index);
            state.live.insert(id);
            state.max_live = state.max_live.max(state.live.len());
        }
        self.record(&format!("submit job-{}", index));
        Ok(JobId::new(format!("job-{}", index)))
    }

    async fn status(&self, job: &JobId) -> RemoteStatus {
        let status;
        {
            let mut state = self.inner.state.lock().unwrap();
            let polls = state.polls.entry(job.as_str().to_string()).or_insert(0);
            *polls += 1;
            status = if *polls > self.inner.spec.polls_to_finish {
                self.inner
                    .spec
                    .fail_status
                    .get(&job_index(job))
                    .copied()
                    .unwrap_or(RemoteStatus::Finished)
            } else {
                RemoteStatus::Running
            };
            if status.is_terminal() {
                state.live.remove(job.as_str());
            }
        }
        self.record(&format!("status {} {}", job, status));
        status
    }

    async fn fetch_result(&self, job: &JobId, _format: &str) -> Result<String, ClientError> {
        self.record(&format!("fetch {}", job));
        if self.inner.spec.fail_fetch.contains(&job_index(job)) {
            return Err(ClientError::Http("scripted download failure".to_string()));
        }
        match self.inner.spec.result_xml {
            Some(xml) => Ok(xml.to_string()),
            None => Ok(single_match_document(job_index(job))),
        }
    }
}

fn job_index(job: &JobId) -> usize {
    job.as_str()
        .trim_start_matches("job-")
        .parse()
        .unwrap_or_default()
}

/// A one-match result document whose signature accession and name
/// encode the job index.
fn single_match_document(index: usize) -> String {
    format!(
        r#"<protein-matches><protein><matches>
            <hmmer3-match>
              <signature ac="SIG{index}" name="SIG{index}">
                <signature-library-release library="PFAM" version="36.0"/>
              </signature>
              <locations><hmmer3-location start="1" end="8"/></locations>
            </hmmer3-match>
        </matches></protein></protein-matches>"#
    )
}

#[derive(Default)]
struct CollectingProgress {
    messages: Mutex<Vec<String>>,
}

impl ProgressSink for CollectingProgress {
    fn subtask(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn items(n: usize) -> Vec<SequenceRecord> {
    (0..n)
        .map(|i| SequenceRecord::new(format!("seq-{}", i), "MKIRSQVGMVLNLDKCIGCHTC"))
        .collect()
}

fn options() -> ScanOptions {
    ScanOptions::new("tests@example.org")
}

fn fast_config() -> SchedulerConfig {
    SchedulerConfig::new()
        .with_max_concurrent_jobs(3)
        .with_submit_delay(Duration::from_millis(1))
        .with_poll_delay(Duration::from_millis(1))
}

/// Scheduler on a private admission gate so tests stay independent.
fn scheduler(api: ScriptedApi) -> ScanScheduler<ScriptedApi> {
    ScanScheduler::new(api, options())
        .with_config(fast_config())
        .with_gate(AdmissionQueue::new())
}

async fn run_guarded(
    runner: &ScanScheduler<ScriptedApi>,
    items: &[SequenceRecord],
    cancel: &CancellationToken,
) -> Result<Vec<iprscan::annotation::AnnotationSet>, ScanError> {
    timeout(Duration::from_secs(30), runner.run(items, cancel))
        .await
        .expect("scheduler run timed out")
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_results_follow_input_order() {
    let api = ScriptedApi::new(ApiSpec {
        polls_to_finish: 2,
        ..ApiSpec::default()
    });
    let runner = scheduler(api.clone());
    let batch = items(8);

    let results = run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 8);
    for (i, set) in results.iter().enumerate() {
        assert_eq!(
            set.annotations()[0].name(),
            format!("SIG{}", i),
            "slot {} should hold its own sequence's result",
            i
        );
    }
    assert_eq!(api.submissions(), 8);
}

#[tokio::test]
async fn test_window_never_exceeds_cap() {
    let api = ScriptedApi::new(ApiSpec {
        polls_to_finish: 3,
        ..ApiSpec::default()
    });
    let runner = scheduler(api.clone());
    let batch = items(10);

    run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    assert!(api.max_live() >= 1);
    assert!(
        api.max_live() <= 3,
        "in-flight high-water mark was {}",
        api.max_live()
    );
}

#[tokio::test]
async fn test_failed_submissions_leave_empty_slots() {
    let api = ScriptedApi::new(ApiSpec {
        fail_submissions: HashSet::from([1, 4]),
        ..ApiSpec::default()
    });
    let runner = scheduler(api.clone());
    let batch = items(6);

    let results = run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 6);
    for (i, set) in results.iter().enumerate() {
        if i == 1 || i == 4 {
            assert!(set.is_empty(), "slot {} should be empty", i);
        } else {
            assert_eq!(set.len(), 1, "slot {} should hold one annotation", i);
        }
    }
    // Every sequence was attempted; failures never held the window.
    assert_eq!(api.submissions(), 6);
    assert!(api.max_live() <= 3);
}

#[tokio::test]
async fn test_remote_failure_yields_empty_slot() {
    let api = ScriptedApi::new(ApiSpec {
        polls_to_finish: 1,
        fail_status: HashMap::from([(2, RemoteStatus::Failure), (3, RemoteStatus::NotFound)]),
        ..ApiSpec::default()
    });
    let runner = scheduler(api.clone());
    let batch = items(5);

    let results = run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    assert!(results[2].is_empty());
    assert!(results[3].is_empty());
    assert_eq!(results[0].len(), 1);
    assert_eq!(results[1].len(), 1);
    assert_eq!(results[4].len(), 1);
}

#[tokio::test]
async fn test_failed_download_leaves_empty_slot() {
    let api = ScriptedApi::new(ApiSpec {
        fail_fetch: HashSet::from([1]),
        ..ApiSpec::default()
    });
    let runner = scheduler(api);
    let batch = items(3);

    let results = run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[1].is_empty(), "download failure should degrade, not abort");
    assert_eq!(results[0].len(), 1);
    assert_eq!(results[2].len(), 1);
}

#[tokio::test]
async fn test_failed_download_with_extra_features_marks_error() {
    let api = ScriptedApi::new(ApiSpec {
        fail_fetch: HashSet::from([0]),
        ..ApiSpec::default()
    });
    let runner = ScanScheduler::new(api, options().with_extra_features(true))
        .with_config(fast_config())
        .with_gate(AdmissionQueue::new());
    let batch = items(2);

    let results = run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    let marker = &results[0].annotations()[0];
    assert_eq!(marker.name(), SCAN_ERROR_NAME);
    assert_eq!(marker.category(), INTERPRO_TERM_CATEGORY);
    assert_eq!(marker.intervals()[0].start, 1);
    assert_eq!(marker.intervals()[0].end as usize, batch[0].len());
    // The healthy sequence still gets its real result.
    assert_eq!(results[1].len(), 1);
}

#[tokio::test]
async fn test_progress_messages_per_sequence() {
    let progress = Arc::new(CollectingProgress::default());
    let api = ScriptedApi::new(ApiSpec {
        polls_to_finish: 1,
        fail_status: HashMap::from([(3, RemoteStatus::Failure)]),
        ..ApiSpec::default()
    });
    let runner = scheduler(api).with_progress(progress.clone());
    let batch = items(5);

    run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    let messages = progress.messages.lock().unwrap();
    // One opening message, then three per sequence whatever its fate.
    assert_eq!(messages.len(), 3 * 5 + 1);
    assert_eq!(messages[0], "Waiting to execute...");
    assert_eq!(messages[1], "Submitting job for seq-0");
    assert_eq!(messages[2], "seq-0 submitted, awaiting results.");
    assert!(messages.contains(&"Getting results for seq-0".to_string()));
    assert!(
        messages.contains(&"An error occurred with seq-3[job-3]. Status: FAILURE".to_string()),
        "missing failure message in {:?}",
        *messages
    );
}

#[tokio::test]
async fn test_cancellation_aborts_and_releases_gate() {
    let gate = AdmissionQueue::new();
    let api = ScriptedApi::new(ApiSpec {
        polls_to_finish: u32::MAX,
        ..ApiSpec::default()
    });
    let runner = ScanScheduler::new(api, options())
        .with_config(fast_config())
        .with_gate(gate.clone());
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        let batch = items(2);
        tokio::spawn(async move { runner.run(&batch, &cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let result = timeout(Duration::from_secs(5), handle)
        .await
        .expect("cancellation not honored")
        .unwrap();
    assert_eq!(result.unwrap_err(), ScanError::Cancelled);

    // The aborted batch released its ticket; a new batch gets through.
    let follow_up = ScanScheduler::new(ScriptedApi::new(ApiSpec::default()), options())
        .with_config(fast_config())
        .with_gate(gate);
    let results = run_guarded(&follow_up, &items(1), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_shared_gate_serializes_batches() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let gate = AdmissionQueue::new();

    let api_a = ScriptedApi::new(ApiSpec {
        polls_to_finish: 2,
        tag: "a",
        events: Some(events.clone()),
        ..ApiSpec::default()
    });
    let api_b = ScriptedApi::new(ApiSpec {
        tag: "b",
        events: Some(events.clone()),
        ..ApiSpec::default()
    });
    let runner_a = ScanScheduler::new(api_a, options())
        .with_config(fast_config())
        .with_gate(gate.clone());
    let runner_b = ScanScheduler::new(api_b, options())
        .with_config(fast_config())
        .with_gate(gate);

    let first = tokio::spawn(async move {
        let batch = items(3);
        runner_a.run(&batch, &CancellationToken::new()).await
    });
    // Give the first batch time to take the gate.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = tokio::spawn(async move {
        let batch = items(2);
        runner_b.run(&batch, &CancellationToken::new()).await
    });

    timeout(Duration::from_secs(30), first)
        .await
        .expect("first batch timed out")
        .unwrap()
        .unwrap();
    timeout(Duration::from_secs(30), second)
        .await
        .expect("second batch timed out")
        .unwrap()
        .unwrap();

    let log = events.lock().unwrap();
    let first_b = log
        .iter()
        .position(|e| e.starts_with("b:"))
        .expect("second batch should have reached the service");
    assert!(
        log[first_b..].iter().all(|e| e.starts_with("b:")),
        "batches interleaved: {:?}",
        *log
    );
}

#[tokio::test]
async fn test_full_result_document_through_scheduler() {
    let api = ScriptedApi::new(ApiSpec {
        result_xml: Some(NARH_XML),
        ..ApiSpec::default()
    });
    let runner = scheduler(api);
    let batch = vec![SequenceRecord::new("NARH", "MKIRSQVGMVLNLDKCIGCHTC")];

    let results = run_guarded(&runner, &batch, &CancellationToken::new())
        .await
        .unwrap();

    // Ten matches plus three distinct InterPro entries in default mode.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].len(), 13);
}
