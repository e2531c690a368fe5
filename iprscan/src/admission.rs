//! Process-local batch admission gate.
//!
//! Only one batch run scans at a time within a process; runs queue in
//! arrival order and are admitted first-in, first-out. The gate is
//! deliberately process-local: separate processes coordinate with the
//! remote service only through the per-run job cap.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;

/// How often a waiting run re-checks its queue position. Covers wakeups
/// lost between the head check and notification registration.
const TURN_CHECK_INTERVAL: Duration = Duration::from_millis(250);

static PROCESS_GATE: OnceLock<AdmissionQueue> = OnceLock::new();

/// The queue shared by every scheduler in this process unless one is
/// substituted explicitly.
pub fn process_gate() -> AdmissionQueue {
    PROCESS_GATE.get_or_init(AdmissionQueue::new).clone()
}

/// FIFO admission queue for batch runs.
///
/// Clones share the same queue. A run calls [`AdmissionQueue::enter`],
/// holds the returned ticket for its whole lifetime, and releases the
/// slot by dropping it, which wakes the next run in line.
#[derive(Debug, Clone, Default)]
pub struct AdmissionQueue {
    inner: Arc<GateInner>,
}

#[derive(Debug, Default)]
struct GateInner {
    waiting: Mutex<VecDeque<u64>>,
    turn: Notify,
    next_ticket: AtomicU64,
}

impl AdmissionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the queue and wait until this run reaches the head.
    ///
    /// Returns [`ScanError::Cancelled`] if the token fires first; the
    /// queued ticket is removed before returning.
    pub async fn enter(&self, cancel: &CancellationToken) -> Result<AdmissionTicket, ScanError> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        let id = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.inner.waiting.lock().unwrap().push_back(id);
        // The guard exists from this point, so every exit path dequeues.
        let ticket = AdmissionTicket {
            id,
            queue: self.clone(),
        };
        while !self.at_head(id) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                _ = self.inner.turn.notified() => {}
                _ = tokio::time::sleep(TURN_CHECK_INTERVAL) => {}
            }
        }
        Ok(ticket)
    }

    /// Number of runs currently queued, the admitted head included.
    pub fn waiting(&self) -> usize {
        self.inner.waiting.lock().unwrap().len()
    }

    fn at_head(&self, id: u64) -> bool {
        self.inner.waiting.lock().unwrap().front() == Some(&id)
    }

    fn remove(&self, id: u64) {
        let mut waiting = self.inner.waiting.lock().unwrap();
        if let Some(position) = waiting.iter().position(|&ticket| ticket == id) {
            waiting.remove(position);
        }
        drop(waiting);
        self.inner.turn.notify_waiters();
    }
}

/// Queue membership guard. Dropping it, on completion, error,
/// cancellation, or unwind, removes the ticket and notifies waiters.
#[derive(Debug)]
pub struct AdmissionTicket {
    id: u64,
    queue: AdmissionQueue,
}

impl Drop for AdmissionTicket {
    fn drop(&mut self) {
        self.queue.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_empty_queue_admits_immediately() {
        let queue = AdmissionQueue::new();
        let cancel = CancellationToken::new();
        let ticket = timeout(WAIT, queue.enter(&cancel)).await.unwrap().unwrap();
        assert_eq!(queue.waiting(), 1);
        drop(ticket);
        assert_eq!(queue.waiting(), 0);
    }

    #[tokio::test]
    async fn test_second_run_waits_for_first() {
        let queue = AdmissionQueue::new();
        let cancel = CancellationToken::new();
        let first = queue.enter(&cancel).await.unwrap();

        let waiter = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { queue.enter(&cancel).await })
        };
        // Give the second run time to enqueue behind the head.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.waiting(), 2);
        assert!(!waiter.is_finished());

        drop(first);
        let ticket = timeout(WAIT, waiter).await.unwrap().unwrap().unwrap();
        assert_eq!(queue.waiting(), 1);
        drop(ticket);
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_removes_ticket() {
        let queue = AdmissionQueue::new();
        let cancel = CancellationToken::new();
        let head = queue.enter(&cancel).await.unwrap();

        let waiting_cancel = CancellationToken::new();
        let waiter = {
            let queue = queue.clone();
            let waiting_cancel = waiting_cancel.clone();
            tokio::spawn(async move { queue.enter(&waiting_cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.waiting(), 2);

        waiting_cancel.cancel();
        let result = timeout(WAIT, waiter).await.unwrap().unwrap();
        assert_eq!(result.unwrap_err(), ScanError::Cancelled);
        assert_eq!(queue.waiting(), 1);
        drop(head);
    }

    #[tokio::test]
    async fn test_cancelled_before_entering_never_queues() {
        let queue = AdmissionQueue::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = queue.enter(&cancel).await;
        assert_eq!(result.unwrap_err(), ScanError::Cancelled);
        assert_eq!(queue.waiting(), 0);
    }

    #[tokio::test]
    async fn test_admission_order_is_fifo() {
        let queue = AdmissionQueue::new();
        let cancel = CancellationToken::new();
        let head = queue.enter(&cancel).await.unwrap();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let queue = queue.clone();
            let cancel = cancel.clone();
            waiters.push(tokio::spawn(async move { queue.enter(&cancel).await }));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(queue.waiting(), 4);

        drop(head);
        for waiter in waiters {
            let ticket = timeout(WAIT, waiter).await.unwrap().unwrap().unwrap();
            drop(ticket);
        }
        assert_eq!(queue.waiting(), 0);
    }
}
