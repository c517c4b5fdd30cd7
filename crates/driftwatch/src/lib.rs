//! # driftwatch - Poll-Based Change Data Capture
//!
//! Change data capture for relational databases that exposes no usable
//! binlog/WAL stream: each run rediscovers a table's relational shape from
//! foreign-key metadata, materializes every row with its related rows into
//! a nested document, diffs the document set against the previous run's
//! snapshot, and hands the differences to pluggable sinks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌──────────────┐
//! │   Catalog   │───▶│ Descriptor   │───▶│ Materializer │
//! │ (metadata + │    │ Builder +    │    │ (rows →      │
//! │  row fetch) │    │ Classifier   │    │  documents)  │
//! └─────────────┘    └──────────────┘    └──────┬───────┘
//!                                               │
//!                    ┌──────────────┐    ┌──────▼───────┐
//!                    │ SnapshotStore│◀──▶│  Diff Engine │
//!                    └──────────────┘    └──────┬───────┘
//!                                               │ non-empty
//!                    ┌──────────────┐    ┌──────▼───────┐
//!                    │ ChangeSinks  │◀───│  Dispatcher  │
//!                    │ (webhook/log)│    └──────────────┘
//!                    └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn example() -> driftwatch::Result<()> {
//! use driftwatch::{FileSnapshotStore, LogSink, Poller};
//! use std::sync::Arc;
//!
//! # let catalog: Arc<dyn driftwatch::Catalog> = unimplemented!();
//! let store = Arc::new(FileSnapshotStore::new("./snapshots").await?);
//! let poller = Poller::new(catalog, store, vec![Arc::new(LogSink::new())])
//!     .with_tables(vec!["users".into(), "posts".into()]);
//!
//! let summary = poller.run().await?;
//! println!("{} table(s) changed", summary.changed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees and limitations
//!
//! This is a best-effort poller, not a log-based pipeline: insert, update
//! and delete are inferred by the diff, reads take no cross-statement
//! transaction (a document can reflect a moving target when writes race a
//! run), and delivery is at-most-once — the snapshot advances before the
//! sinks run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod classify;
pub mod descriptor;
pub mod diff;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod field;
pub mod materialize;
pub mod poller;
pub mod sink;
pub mod snapshot;
pub mod webhook;

// Core pipeline types
pub use catalog::{Catalog, ForeignKey, MemoryCatalog, MemoryTable};
pub use diff::diff;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{Error, ErrorCategory, Result};
pub use poller::{Poller, RunSummary, TableOutcome};

// Field and document model
pub use document::{
    document_key, ChangeKind, ChangePayload, ChangeRecord, Document, DocumentMap, RowObject,
    NESTED_KEY,
};
pub use field::{Column, JunctionLink, LinkedField, PrimaryKey, Relation, TableDescriptor};

// Classification and materialization
pub use classify::{is_junction_table, Classifier, Relationships};
pub use descriptor::DescriptorBuilder;
pub use materialize::Materializer;

// Persistence and delivery
pub use sink::{ChangeSink, LogSink};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use webhook::{WebhookConfig, WebhookSink};
