//! Change sinks
//!
//! A sink is the pluggable destination for one table's change set. Sinks
//! are injected capabilities: the dispatcher owns the fan-out and the
//! failure isolation, a sink only knows how to deliver one payload.

use async_trait::async_trait;
use tracing::info;

use crate::document::ChangePayload;
use crate::error::Result;

/// Destination for change payloads
#[async_trait]
pub trait ChangeSink: Send + Sync {
    /// Sink name for logs and error attribution
    fn name(&self) -> &str;

    /// Deliver one table's change payload.
    ///
    /// Failures are reported to the dispatcher; they never roll back the
    /// already-saved snapshot.
    async fn deliver(&self, table: &str, payload: &ChangePayload) -> Result<()>;
}

/// Sink that writes the payload as a structured log line.
///
/// The default when no transport is configured; also useful as a dry-run
/// mode for new deployments.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl LogSink {
    /// Create a log sink
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChangeSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, table: &str, payload: &ChangePayload) -> Result<()> {
        info!(
            table,
            items = payload.items.len(),
            payload = %serde_json::to_string(payload)?,
            "change set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChangeRecord, Document, RowObject};
    use serde_json::json;

    #[tokio::test]
    async fn test_log_sink_accepts_payload() {
        let mut row = RowObject::new();
        row.insert("id".into(), json!(1));
        let payload = ChangePayload::new(
            "users",
            vec![ChangeRecord::added(Document::from_row(row))],
        );

        let sink = LogSink::new();
        assert_eq!(sink.name(), "log");
        sink.deliver("users", &payload).await.unwrap();
    }
}
