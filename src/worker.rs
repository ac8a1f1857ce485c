use crate::executor::RequestExecutor;
use crate::metrics::Metrics;
use crate::rate_limiter::RateLimiter;
use crate::shutdown::ShutdownSignal;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Exited,
}

/// What a worker did before it exited.
#[derive(Debug, Clone)]
pub struct WorkerSummary {
    pub id: usize,
    pub attempts: u64,
    pub elapsed: Duration,
}

pub struct Worker {
    id: usize,
    executor: RequestExecutor,
    metrics: Arc<Metrics>,
    interval: Option<Duration>,
    signal: ShutdownSignal,
}

impl Worker {
    pub fn new(
        id: usize,
        executor: RequestExecutor,
        metrics: Arc<Metrics>,
        interval: Option<Duration>,
        signal: ShutdownSignal,
    ) -> Self {
        Self {
            id,
            executor,
            metrics,
            interval,
            signal,
        }
    }

    /// Run until the shutdown signal is observed between attempts.
    pub async fn run(self) -> WorkerSummary {
        let started = Instant::now();
        let mut limiter = RateLimiter::new(self.interval);
        let mut attempts = 0u64;

        tracing::debug!(worker_id = self.id, paced = limiter.is_enabled(), "Worker started");

        while self.next_state(&mut limiter).await == WorkerState::Running {
            self.executor.execute(self.id).await;
            self.metrics.record_attempt();
            attempts += 1;
        }

        let summary = WorkerSummary {
            id: self.id,
            attempts,
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            worker_id = self.id,
            attempts,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Worker finished"
        );
        summary
    }

    async fn next_state(&self, limiter: &mut RateLimiter) -> WorkerState {
        if limiter.is_enabled() {
            tokio::select! {
                biased;

                _ = self.signal.cancelled() => WorkerState::Exited,
                _ = limiter.wait() => WorkerState::Running,
            }
        } else {
            tokio::task::yield_now().await;
            if self.signal.is_cancelled() {
                WorkerState::Exited
            } else {
                WorkerState::Running
            }
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .finish()
    }
}
