//! Poller
//!
//! One run processes the configured tables sequentially: build the
//! descriptor, materialize the documents, diff against the stored
//! snapshot, dispatch when something changed. A failure in one table
//! aborts only that table; the run continues and the failure shows up in
//! the summary. Recovery is the next schedule tick, not an in-run retry.

use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::descriptor::DescriptorBuilder;
use crate::diff::diff;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::Result;
use crate::materialize::Materializer;
use crate::sink::ChangeSink;
use crate::snapshot::SnapshotStore;

/// What happened to one table during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    /// Table has no usable primary key and was skipped
    Skipped,
    /// First encounter: baseline snapshot saved, nothing dispatched
    Baseline {
        /// Documents in the baseline
        documents: usize,
    },
    /// Snapshot compared equal, nothing dispatched
    Unchanged,
    /// Differences found and dispatched
    Changed {
        /// Change records in the payload
        items: usize,
        /// Sink delivery counts
        outcome: DispatchOutcome,
    },
}

/// Aggregate result of one run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Tables fully processed (any outcome but a failure)
    pub processed: usize,
    /// Tables skipped as schema-incompatible
    pub skipped: usize,
    /// Tables that saved a first-run baseline
    pub baselines: usize,
    /// Tables that dispatched a change set
    pub changed: usize,
    /// Tables with no differences
    pub unchanged: usize,
    /// Tables whose processing aborted, with the error message
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    /// Whether any table failed during the run
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record(&mut self, outcome: TableOutcome) {
        self.processed += 1;
        match outcome {
            TableOutcome::Skipped => self.skipped += 1,
            TableOutcome::Baseline { .. } => self.baselines += 1,
            TableOutcome::Unchanged => self.unchanged += 1,
            TableOutcome::Changed { .. } => self.changed += 1,
        }
    }
}

/// The poll-based CDC pipeline over one catalog
pub struct Poller {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn SnapshotStore>,
    dispatcher: Dispatcher,
    tables: Vec<String>,
}

impl Poller {
    /// Create a poller watching every table the catalog lists
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn SnapshotStore>,
        sinks: Vec<Arc<dyn ChangeSink>>,
    ) -> Self {
        Self {
            catalog,
            store,
            dispatcher: Dispatcher::new(sinks),
            tables: Vec::new(),
        }
    }

    /// Restrict the poller to an explicit table list (configured order)
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Run once over the configured tables.
    ///
    /// Returns `Err` only for process-level failures (the catalog cannot
    /// even list tables); per-table failures are recorded in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let tables = if self.tables.is_empty() {
            self.catalog.list_tables().await?
        } else {
            self.tables.clone()
        };

        info!(tables = tables.len(), "starting poll run");

        let mut summary = RunSummary::default();
        for table in &tables {
            match self.process_table(table).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!(table = %table, error = %e, "table processing aborted");
                    summary.failures.push((table.clone(), e.to_string()));
                }
            }
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            baselines = summary.baselines,
            changed = summary.changed,
            unchanged = summary.unchanged,
            failed = summary.failures.len(),
            "poll run finished"
        );
        Ok(summary)
    }

    /// Process a single table end to end
    pub async fn process_table(&self, table: &str) -> Result<TableOutcome> {
        let Some(descriptor) = DescriptorBuilder::new(self.catalog.as_ref())
            .build(table)
            .await?
        else {
            return Ok(TableOutcome::Skipped);
        };

        let current = Materializer::new(self.catalog.as_ref())
            .materialize(&descriptor)
            .await?;

        let Some(previous) = self.store.load(table).await? else {
            // First run over this table: save the baseline, report nothing.
            self.store.save(table, &current).await?;
            info!(table, documents = current.len(), "baseline snapshot saved");
            return Ok(TableOutcome::Baseline {
                documents: current.len(),
            });
        };

        let changes = diff(&current, &previous);
        if changes.is_empty() {
            return Ok(TableOutcome::Unchanged);
        }

        let items = changes.len();
        let outcome = self
            .dispatcher
            .dispatch(self.store.as_ref(), table, &current, changes)
            .await?;

        Ok(TableOutcome::Changed { items, outcome })
    }
}
