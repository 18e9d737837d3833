//! Bounded fan-out of independent async jobs
//!
//! Every job runs to completion (with optional retries) and reports its own
//! outcome; one failure never cancels or hides the others. Jobs are polled
//! from the calling task via `buffer_unordered`, which suits I/O-bound work
//! such as HTTP requests.
//!
//! ## Example
//!
//! ```ignore
//! use cooper::utils::{FanOutOpts, Job, fan_out};
//!
//! let jobs = payloads
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, p)| Job::new(format!("create-{i}"), p));
//! let create = |p| async move { client.create_barrel(&p).await };
//! let outcomes = fan_out(jobs, create, &FanOutOpts::default().limit(10)).await;
//! ```

use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One unit of work with a label for logs and results
#[derive(Debug, Clone)]
pub struct Job<T> {
    pub id: String,
    pub input: T,
}

impl<T> Job<T> {
    pub fn new(id: impl Into<String>, input: T) -> Self {
        Self {
            id: id.into(),
            input,
        }
    }
}

/// What happened to one job
#[derive(Debug)]
pub struct JobOutcome<V, E> {
    pub id: String,
    /// Attempts made, including the first
    pub attempts: u32,
    /// Wall time across all attempts
    pub elapsed: Duration,
    pub result: Result<V, E>,
}

impl<V, E> JobOutcome<V, E> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Limits for [`fan_out`]
#[derive(Debug, Clone)]
pub struct FanOutOpts {
    /// Jobs in flight at once (None = all of them)
    pub limit: Option<usize>,
    /// Extra attempts after a failure
    pub retries: u32,
    /// Wait before retry `n` is `backoff * n`
    pub backoff: Duration,
}

impl Default for FanOutOpts {
    fn default() -> Self {
        Self {
            limit: None,
            retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl FanOutOpts {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.max(1));
        self
    }

    pub fn retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }
}

/// Run `task` on every job's input and return one outcome per job
///
/// Outcomes arrive in completion order, not submission order.
pub async fn fan_out<T, V, E, F, Fut>(
    jobs: impl IntoIterator<Item = Job<T>>,
    task: F,
    opts: &FanOutOpts,
) -> Vec<JobOutcome<V, E>>
where
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: Display,
{
    let jobs: Vec<_> = jobs.into_iter().collect();
    if jobs.is_empty() {
        return Vec::new();
    }

    let in_flight = opts.limit.unwrap_or(jobs.len());
    let task = &task;

    stream::iter(jobs)
        .map(|job| async move {
            let started = Instant::now();
            let mut attempts = 1;
            let result = loop {
                match task(job.input.clone()).await {
                    Err(e) if attempts <= opts.retries => {
                        let wait = opts.backoff * attempts;
                        debug!(
                            job = %job.id,
                            attempts,
                            error = %e,
                            wait_ms = wait.as_millis(),
                            "Job failed, retrying"
                        );
                        tokio::time::sleep(wait).await;
                        attempts += 1;
                    }
                    Err(e) => {
                        warn!(job = %job.id, attempts, error = %e, "Job failed");
                        break Err(e);
                    }
                    Ok(value) => break Ok(value),
                }
            };
            JobOutcome {
                id: job.id,
                attempts,
                elapsed: started.elapsed(),
                result,
            }
        })
        .buffer_unordered(in_flight)
        .collect()
        .await
}
