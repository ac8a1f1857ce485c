use crate::metrics::{Metrics, Snapshot};
use crate::pool::WorkerPool;
use crate::shutdown::ShutdownSignal;

use chrono::{DateTime, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const PROGRESS_PERIOD: Duration = Duration::from_secs(2);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone)]
pub struct Report {
    pub snapshot: Snapshot,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl Report {
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.snapshot.total as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total requests made: {}", self.snapshot.total)?;
        writeln!(
            f,
            "Elapsed: {:.2}s ({:.1} req/s)",
            self.elapsed.as_secs_f64(),
            self.requests_per_second()
        )?;
        writeln!(
            f,
            "Started: {}, finished: {}",
            self.started_at.format(TIMESTAMP_FORMAT),
            self.finished_at.format(TIMESTAMP_FORMAT)
        )?;
        write!(f, "{}", style("Status code distribution:").bold())?;
        for (code, count) in self.snapshot.sorted_statuses() {
            write!(f, "\nHTTP {}: {} requests", code, count)?;
        }
        let failures = self.snapshot.failures();
        if failures > 0 {
            write!(f, "\nFailed before response: {} requests", failures)?;
        }
        Ok(())
    }
}

pub struct Reporter {
    metrics: Arc<Metrics>,
    signal: ShutdownSignal,
    period: Duration,
    progress: ProgressBar,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Reporter {
    pub fn new(metrics: Arc<Metrics>, signal: ShutdownSignal) -> Self {
        let progress = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        let sty = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(sty);

        Self {
            metrics,
            signal,
            period: PROGRESS_PERIOD,
            progress,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Consumes the reporter and the pool, so a run reports exactly once.
    pub async fn run(self, pool: WorkerPool) -> Report {
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.signal.cancelled() => break,
                _ = ticker.tick() => self.show_progress(),
            }
        }

        let workers = pool.join().await;
        tracing::debug!(workers = workers.len(), "All workers exited");

        let report = Report {
            snapshot: self.metrics.snapshot(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed: self.started.elapsed(),
        };
        self.progress.finish_and_clear();
        println!("\n{}", report);
        report
    }

    fn show_progress(&self) {
        let line = progress_line(self.metrics.total());
        // Not a terminal: fall back to a carriage-return line.
        if self.progress.is_hidden() {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{}\r", line);
            let _ = stdout.flush();
        }
        self.progress.set_message(line);
        self.progress.tick();
    }

    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }
}

fn progress_line(total: u64) -> String {
    format!("Total requests made so far: {}", total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{RequestExecutor, Transport};
    use crate::model::RunConfig;
    use crate::shutdown::Shutdown;
    use crate::testing::StaticTransport;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn config(workers: usize) -> RunConfig {
        RunConfig {
            workers,
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "k".to_string(),
            model: "m".to_string(),
            prompt: "p".to_string(),
            interval: None,
            timeout: None,
        }
    }

    fn start(
        workers: usize,
        transport: Arc<dyn Transport>,
        shutdown: &Shutdown,
    ) -> (Reporter, WorkerPool) {
        let metrics = Arc::new(Metrics::new());
        let reporter = Reporter::new(Arc::clone(&metrics), shutdown.signal())
            .with_progress(ProgressBar::hidden());
        let executor = RequestExecutor::new(transport, Arc::clone(&metrics));
        let pool = WorkerPool::spawn(&config(workers), executor, metrics, shutdown.signal());
        (reporter, pool)
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_after_three_ticks_matches_histogram() {
        let shutdown = Shutdown::new();
        let transport = Arc::new(StaticTransport::new(200).with_delay(Duration::from_millis(10)));
        let (reporter, pool) = start(1, transport, &shutdown);
        let progress = reporter.progress().clone();

        let handle = tokio::spawn(reporter.run(pool));
        time::sleep(PROGRESS_PERIOD * 3 + Duration::from_millis(5)).await;
        assert!(progress.message().starts_with("Total requests made so far: "));
        shutdown.trigger();
        let report = handle.await.unwrap();

        let n = report.snapshot.total;
        assert!(n > 0);
        assert_eq!(report.snapshot.statuses, HashMap::from([(200, n)]));
        assert!(report.elapsed >= PROGRESS_PERIOD * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_waits_for_drain() {
        let shutdown = Shutdown::new();
        let transport = Arc::new(StaticTransport::new(503).with_delay(Duration::from_secs(30)));
        let (reporter, pool) = start(4, transport, &shutdown);

        let handle = tokio::spawn(reporter.run(pool));
        time::sleep(Duration::from_secs(1)).await;
        shutdown.trigger();
        shutdown.trigger();
        let report = handle.await.unwrap();

        // Every in-flight attempt landed before the snapshot was taken.
        assert_eq!(report.snapshot.total, 4);
        assert_eq!(report.snapshot.statuses.get(&503), Some(&4));
        assert!(report.elapsed >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_progress_before_first_period() {
        let shutdown = Shutdown::new();
        let transport = Arc::new(StaticTransport::new(200).with_delay(Duration::from_millis(10)));
        let (reporter, pool) = start(1, transport, &shutdown);
        let reporter = reporter.with_period(Duration::from_secs(60));
        let progress = reporter.progress().clone();

        let handle = tokio::spawn(reporter.run(pool));
        time::sleep(Duration::from_secs(1)).await;
        shutdown.trigger();
        handle.await.unwrap();

        assert!(progress.message().is_empty());
    }

    #[test]
    fn test_report_display() {
        let report = Report {
            snapshot: Snapshot {
                total: 13,
                statuses: HashMap::from([(500, 5), (200, 5)]),
            },
            started_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 2).unwrap(),
            elapsed: Duration::from_secs(2),
        };

        let text = report.to_string();
        assert!(text.starts_with("Total requests made: 13\n"));
        assert!(text.contains("Elapsed: 2.00s (6.5 req/s)"));
        assert!(text.contains("Started: 2024-03-01 12:00:00 UTC, finished: 2024-03-01 12:00:02 UTC"));
        assert!(text.contains("Status code distribution:"));
        let http_200 = text.find("HTTP 200: 5 requests").unwrap();
        let http_500 = text.find("HTTP 500: 5 requests").unwrap();
        assert!(http_200 < http_500);
        assert!(text.ends_with("Failed before response: 3 requests"));
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(progress_line(42), "Total requests made so far: 42");
    }

    #[tokio::test]
    async fn test_hidden_progress_still_tracks_total() {
        let metrics = Arc::new(Metrics::new());
        metrics.record_attempt();
        metrics.record_attempt();
        let shutdown = Shutdown::new();
        let reporter =
            Reporter::new(metrics, shutdown.signal()).with_progress(ProgressBar::hidden());

        reporter.show_progress();

        assert!(reporter.progress().is_hidden());
        assert_eq!(reporter.progress().message(), "Total requests made so far: 2");
    }

    #[test]
    fn test_report_display_omits_failures_when_none() {
        let report = Report {
            snapshot: Snapshot {
                total: 2,
                statuses: HashMap::from([(200, 2)]),
            },
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed: Duration::ZERO,
        };

        let text = report.to_string();
        assert!(!text.contains("Failed before response"));
        assert_eq!(report.requests_per_second(), 0.0);
    }
}
