use crate::error::Result;
use crate::executor::Transport;
use crate::shutdown::Shutdown;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Always answers with the same status, optionally after a delay.
pub(crate) struct StaticTransport {
    status: u16,
    delay: Option<Duration>,
    pub(crate) calls: AtomicUsize,
}

impl StaticTransport {
    pub(crate) fn new(status: u16) -> Self {
        Self {
            status,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn send(&self) -> Result<u16> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.status)
    }
}

/// Alternates a 500 response with a refused connection, and triggers
/// shutdown once `limit` calls have been made.
pub(crate) struct FlakyTransport {
    refused_url: String,
    limit: usize,
    shutdown: Shutdown,
    calls: AtomicUsize,
}

impl FlakyTransport {
    pub(crate) fn new(limit: usize, shutdown: Shutdown) -> Self {
        Self {
            refused_url: refused_url(),
            limit,
            shutdown,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn send(&self) -> Result<u16> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.limit {
            self.shutdown.trigger();
        }
        if call % 2 == 1 {
            return Ok(500);
        }
        reqwest::Client::new().get(&self.refused_url).send().await?;
        Ok(200)
    }
}

/// A local URL nothing is listening on.
pub(crate) fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
