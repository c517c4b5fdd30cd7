//! Error types for driftwatch
//!
//! Provides granular error classification for the poller's recovery rules:
//! - Schema errors mark a table or relation as unsupported (skip, continue)
//! - Connection/query/timeout errors abort one table's processing
//! - Sink errors are isolated per sink and never roll back a snapshot

use std::fmt;
use thiserror::Error;

/// Result type for driftwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection-related errors (retriable at the next run)
    Connection,
    /// Query execution errors
    Query,
    /// Schema-related errors (no primary key, ambiguous junction)
    Schema,
    /// Snapshot persistence errors
    Snapshot,
    /// Sink delivery errors
    Sink,
    /// Serialization errors (JSON)
    Serialization,
    /// Configuration errors
    Configuration,
    /// Timeout errors (retriable at the next run)
    Timeout,
    /// Unknown/other errors
    Other,
}

impl ErrorCategory {
    /// Whether errors in this category are expected to clear on a re-run
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection | Self::Query | Self::Timeout)
    }
}

/// Main error type for driftwatch
#[derive(Error, Debug)]
pub enum Error {
    /// Connection to the database failed
    #[error("connection error: {message}")]
    Connection {
        /// Human-readable description
        message: String,
        /// Underlying driver error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution failed
    #[error("query error: {message}")]
    Query {
        /// Human-readable description
        message: String,
        /// The statement that failed, if known
        sql: Option<String>,
        /// Underlying driver error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Schema error (missing primary key, ambiguous junction table)
    #[error("schema error: {message}")]
    Schema {
        /// Human-readable description
        message: String,
    },

    /// Snapshot load/save failed
    #[error("snapshot error: {message}")]
    Snapshot {
        /// Human-readable description
        message: String,
    },

    /// Sink delivery failed
    #[error("sink error: {sink}: {message}")]
    Sink {
        /// Name of the sink that failed
        sink: String,
        /// Human-readable description
        message: String,
    },

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation timed out
    #[error("timeout: {message}")]
    Timeout {
        /// Human-readable description
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description
        message: String,
    },

    /// Internal error
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description
        message: String,
    },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Query { .. } => ErrorCategory::Query,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::Snapshot { .. } => ErrorCategory::Snapshot,
            Self::Sink { .. } => ErrorCategory::Sink,
            Self::Json(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Snapshot,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Other,
        }
    }

    /// Whether a re-run at the next schedule tick may succeed
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Create a query error with SQL
    pub fn query_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(sql.into()),
            source: None,
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a snapshot error
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Query => write!(f, "query"),
            Self::Schema => write!(f, "schema"),
            Self::Snapshot => write!(f, "snapshot"),
            Self::Sink => write!(f, "sink"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Timeout => write!(f, "timeout"),
            Self::Other => write!(f, "other"),
        }
    }
}
