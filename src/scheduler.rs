//! Periodic execution of the pipeline.
//!
//! A single loop runs the job once at startup and again whenever `interval`
//! has elapsed since the previous run started, checking every `tick`. Runs
//! never overlap. Each run is spawned as its own task, so an `Err` or a
//! panic is caught here, logged, and the job is retried once
//! `error_backoff` has passed instead of waiting out the full interval.
//! Only the shutdown signal ends the loop.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{error, info, instrument, warn};

use crate::config::Settings;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    tick: Duration,
    error_backoff: Duration,
}

impl From<&Settings> for Scheduler {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.interval, settings.tick, settings.error_backoff)
    }
}

impl Scheduler {
    pub fn new(interval: Duration, tick: Duration, error_backoff: Duration) -> Self {
        Self {
            interval,
            tick: tick.min(interval).max(Duration::from_millis(1)),
            error_backoff,
        }
    }

    /// Run `job` until `shutdown` resolves. Returns the number of runs started.
    #[instrument(level = "info", skip_all, fields(interval = ?self.interval, tick = ?self.tick))]
    pub async fn run<F, Fut, T, S>(&self, mut job: F, shutdown: S) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: std::fmt::Debug + Send + 'static,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut runs = 0;

        loop {
            let started = Instant::now();
            runs += 1;
            info!(run = runs, "starting run");

            let mut handle = tokio::spawn(job());
            let outcome = tokio::select! {
                joined = &mut handle => joined,
                _ = &mut shutdown => {
                    warn!(run = runs, "shutdown requested during run; aborting it");
                    handle.abort();
                    return runs;
                }
            };

            let failed = match outcome {
                Ok(Ok(report)) => {
                    info!(run = runs, elapsed = ?started.elapsed(), ?report, "run completed");
                    false
                }
                Ok(Err(e)) => {
                    error!(run = runs, error = %e, "run failed");
                    true
                }
                Err(e) if e.is_panic() => {
                    error!(run = runs, "run panicked");
                    true
                }
                Err(e) => {
                    error!(run = runs, error = %e, "run task was cancelled");
                    true
                }
            };

            if failed {
                warn!(backoff = ?self.error_backoff, "backing off after failed run");
                tokio::select! {
                    _ = sleep(self.error_backoff) => {}
                    _ = &mut shutdown => return runs,
                }
                // retry now; the interval only applies after a success
                continue;
            }

            while started.elapsed() < self.interval {
                tokio::select! {
                    _ = sleep(self.tick) => {}
                    _ = &mut shutdown => {
                        info!(runs, "shutdown requested; scheduler stopping");
                        return runs;
                    }
                }
            }
        }
    }
}
