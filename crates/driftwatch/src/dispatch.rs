//! Change dispatcher
//!
//! Hands a non-empty change set to the configured sinks and advances the
//! snapshot. The snapshot is persisted *before* any sink is invoked, so a
//! sink failure cannot cause the same change to be reported again on the
//! next run — at-most-once reporting from the poller's point of view.

use std::sync::Arc;
use tracing::{info, warn};

use crate::document::{ChangePayload, ChangeRecord, DocumentMap};
use crate::error::Result;
use crate::sink::ChangeSink;
use crate::snapshot::SnapshotStore;

/// Per-dispatch delivery counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Sinks that accepted the payload
    pub delivered: usize,
    /// Sinks that failed (logged and swallowed)
    pub failed: usize,
}

/// Fans change sets out to sinks with independent failure isolation
pub struct Dispatcher {
    sinks: Vec<Arc<dyn ChangeSink>>,
}

impl Dispatcher {
    /// Create a dispatcher over a set of sinks
    pub fn new(sinks: Vec<Arc<dyn ChangeSink>>) -> Self {
        Self { sinks }
    }

    /// Number of configured sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Dispatch one table's change set.
    ///
    /// No-op when `changes` is empty. Otherwise saves `current` as the new
    /// snapshot, then attempts every sink; one sink's failure never
    /// prevents delivery attempts to the others and never rolls the
    /// snapshot back. A snapshot save failure aborts the dispatch.
    pub async fn dispatch(
        &self,
        store: &dyn SnapshotStore,
        table: &str,
        current: &DocumentMap,
        changes: Vec<ChangeRecord>,
    ) -> Result<DispatchOutcome> {
        if changes.is_empty() {
            return Ok(DispatchOutcome::default());
        }

        store.save(table, current).await?;

        let payload = ChangePayload::new(table, changes);
        let mut outcome = DispatchOutcome::default();

        for sink in &self.sinks {
            match sink.deliver(table, &payload).await {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    warn!(table, sink = sink.name(), error = %e, "sink delivery failed");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            table,
            items = payload.items.len(),
            delivered = outcome.delivered,
            failed = outcome.failed,
            "dispatched change set"
        );
        Ok(outcome)
    }
}
