pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod model;
pub mod pool;
pub mod rate_limiter;
pub mod reporter;
pub mod shutdown;
pub mod worker;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};

use executor::{RequestExecutor, Transport};
use metrics::Metrics;
use model::RunConfig;
use pool::WorkerPool;
use reporter::{Report, Reporter};
use shutdown::Shutdown;
use std::sync::Arc;

/// Load the endpoint with `config.workers` workers until `shutdown` is
/// triggered, then return the final report once every worker has exited.
pub async fn run(
    config: &RunConfig,
    transport: Arc<dyn Transport>,
    shutdown: &Shutdown,
) -> Report {
    let metrics = Arc::new(Metrics::new());
    let executor = RequestExecutor::new(transport, Arc::clone(&metrics));
    let reporter = Reporter::new(Arc::clone(&metrics), shutdown.signal());
    let pool = WorkerPool::spawn(config, executor, metrics, shutdown.signal());
    reporter.run(pool).await
}
