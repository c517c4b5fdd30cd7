//! HTTP webhook sink
//!
//! Posts change payloads as JSON to configured endpoints. URLs are routed
//! per table with a shared fallback list, so one poller can feed different
//! consumers per table. Each URL is attempted independently; a URL failure
//! is logged and the remaining URLs are still tried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use validator::Validate;

use crate::document::ChangePayload;
use crate::error::{Error, Result};
use crate::sink::ChangeSink;

fn default_timeout() -> u64 {
    30
}

/// Webhook sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WebhookConfig {
    /// URLs used for tables without an explicit route
    #[serde(default)]
    pub fallback_urls: Vec<String>,

    /// Per-table URL routing
    #[serde(default)]
    pub table_urls: HashMap<String, Vec<String>>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,

    /// Additional headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            fallback_urls: Vec::new(),
            table_urls: HashMap::new(),
            timeout_secs: default_timeout(),
            headers: HashMap::new(),
        }
    }
}

impl WebhookConfig {
    /// Configuration with a single fallback URL
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            fallback_urls: vec![url.into()],
            ..Default::default()
        }
    }

    /// Route a table to a specific URL
    pub fn route(mut self, table: impl Into<String>, url: impl Into<String>) -> Self {
        self.table_urls
            .entry(table.into())
            .or_default()
            .push(url.into());
        self
    }

    /// The URLs a table's payload goes to
    pub fn urls_for(&self, table: &str) -> &[String] {
        self.table_urls
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback_urls)
    }
}

/// Sink that POSTs change payloads to HTTP endpoints
pub struct WebhookSink {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a webhook sink from a validated configuration
    pub fn new(config: WebhookConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("invalid webhook config: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("failed to build http client: {e}")))?;

        Ok(Self { config, client })
    }

    async fn post(&self, url: &str, payload: &ChangePayload) -> Result<()> {
        let mut request = self.client.post(url).json(payload);
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::sink("webhook", format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::sink(
                "webhook",
                format!("{url}: unexpected status {status}"),
            ));
        }

        debug!(url = %url, table = %payload.table, "webhook delivered");
        Ok(())
    }
}

#[async_trait]
impl ChangeSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, table: &str, payload: &ChangePayload) -> Result<()> {
        let urls = self.config.urls_for(table);
        if urls.is_empty() {
            debug!(table, "no webhook route configured, nothing to deliver");
            return Ok(());
        }

        let mut delivered = 0usize;
        for url in urls {
            match self.post(url, payload).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(table, url = %url, error = %e, "webhook delivery failed"),
            }
        }

        if delivered == 0 {
            return Err(Error::sink(
                "webhook",
                format!("all {} endpoint(s) failed for table {table}", urls.len()),
            ));
        }
        Ok(())
    }
}
