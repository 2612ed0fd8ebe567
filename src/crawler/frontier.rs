//! Crawl frontier with quiescence detection
//!
//! The frontier is a FIFO queue plus a count of jobs that are queued or in
//! flight. A job leaves the count only when its `JobLease` is dropped, which
//! happens after the worker has pushed every link the job discovered. When the
//! count reaches zero no job can produce more work, so the frontier closes
//! itself and every waiting worker is released.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::trace;
use url::Url;

/// A URL scheduled for crawling at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub url: Url,
    pub depth: u32,
}

impl CrawlJob {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlJob>,
    /// Jobs queued plus jobs leased and not yet completed
    pending: usize,
    closed: bool,
}

/// Shared work queue for one crawl run
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a job
    ///
    /// # Returns
    ///
    /// * `true` - The job was queued
    /// * `false` - The frontier is closed and the job was dropped
    pub fn push(&self, job: CrawlJob) -> bool {
        {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            trace!("Frontier push (depth {}): {}", job.depth, job.url);
            state.queue.push_back(job);
            state.pending += 1;
        }
        self.notify.notify_one();
        true
    }

    /// Takes the next job, waiting while other jobs are still in flight
    ///
    /// Returns `None` once the frontier is closed or quiescent (nothing queued
    /// and nothing in flight).
    pub async fn pop(&self) -> Option<JobLease<'_>> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking state so a wakeup between the check and the await is kept
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(job) = state.queue.pop_front() {
                    trace!("Frontier pop (depth {}): {}", job.depth, job.url);
                    return Some(JobLease {
                        frontier: self,
                        job,
                    });
                }
                if state.closed || state.pending == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Stops the frontier: queued jobs are discarded and waiters released
    ///
    /// Jobs already leased still complete normally.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            let dropped = state.queue.len();
            state.queue.clear();
            state.pending -= dropped;
            state.closed = true;
            if dropped > 0 {
                trace!("Frontier closed, {} queued jobs dropped", dropped);
            }
        }
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Jobs queued or in flight
    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    fn complete(&self) {
        let quiescent = {
            let mut state = self.lock();
            state.pending = state.pending.saturating_sub(1);
            if state.pending == 0 {
                state.closed = true;
            }
            state.pending == 0
        };
        if quiescent {
            trace!("Frontier quiescent");
            self.notify.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A job taken from the frontier; dropping it marks the job complete
#[derive(Debug)]
pub struct JobLease<'a> {
    frontier: &'a Frontier,
    job: CrawlJob,
}

impl JobLease<'_> {
    pub fn job(&self) -> &CrawlJob {
        &self.job
    }
}

impl Drop for JobLease<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
