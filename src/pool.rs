use crate::executor::RequestExecutor;
use crate::metrics::Metrics;
use crate::model::RunConfig;
use crate::shutdown::ShutdownSignal;
use crate::worker::{Worker, WorkerSummary};

use std::sync::Arc;
use tokio::task::JoinSet;

/// Owns the worker tasks of one run. Dropping it aborts them.
pub struct WorkerPool {
    tasks: JoinSet<WorkerSummary>,
    size: usize,
}

impl WorkerPool {
    pub fn spawn(
        config: &RunConfig,
        executor: RequestExecutor,
        metrics: Arc<Metrics>,
        signal: ShutdownSignal,
    ) -> Self {
        let mut tasks = JoinSet::new();
        for id in 0..config.workers {
            let worker = Worker::new(
                id,
                executor.clone(),
                Arc::clone(&metrics),
                config.interval,
                signal.clone(),
            );
            tasks.spawn(worker.run());
        }

        tracing::debug!(workers = config.workers, "Worker pool started");

        Self {
            tasks,
            size: config.workers,
        }
    }

    /// Wait until every worker has exited. Panicked workers are skipped.
    pub async fn join(mut self) -> Vec<WorkerSummary> {
        let mut summaries = Vec::with_capacity(self.size);
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::error!(error = %e, "Worker task panicked"),
            }
        }
        summaries.sort_by_key(|s| s.id);

        tracing::debug!(
            workers = summaries.len(),
            attempts = summaries.iter().map(|s| s.attempts).sum::<u64>(),
            "Worker pool drained"
        );
        summaries
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("running", &self.tasks.len())
            .finish()
    }
}
