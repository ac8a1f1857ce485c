use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::model::{ChatPayload, RunConfig};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the response's status code, whatever it is.
    async fn send(&self) -> Result<u16>;
}

/// Build the client shared by every worker.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(Error::Client)
}

/// [`Transport`] that POSTs the configured chat payload over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    payload: ChatPayload,
}

impl HttpTransport {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &RunConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            payload: config.payload(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self) -> Result<u16> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&self.payload)
            .send()
            .await?;

        // The body is never read; dropping the response releases it.
        Ok(response.status().as_u16())
    }
}

/// Sends one request per call and records the status it gets back.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    metrics: Arc<Metrics>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, metrics: Arc<Metrics>) -> Self {
        Self { transport, metrics }
    }

    /// Returns the recorded status, or `None` if no response arrived.
    pub async fn execute(&self, worker_id: usize) -> Option<u16> {
        match self.transport.send().await {
            Ok(status) => {
                self.metrics.record_status(status);
                Some(status)
            }
            Err(e) => {
                tracing::warn!(worker_id, error = %e, "Request failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("metrics", &self.metrics)
            .finish()
    }
}
