//! Materialized document model
//!
//! A `Document` is one row plus its attached related rows: a flat JSON
//! object for the row's own columns, with a reserved `nested` sub-map
//! holding parent/child/many-to-many sub-documents. A `DocumentMap` is one
//! table's complete document set at one point in time — the unit that is
//! persisted as a snapshot and the unit that is diffed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved document key holding attached sub-documents.
///
/// Content under this key never participates in change detection.
pub const NESTED_KEY: &str = "nested";

/// A row as a JSON object (column name → value)
pub type RowObject = serde_json::Map<String, Value>;

/// One table's documents keyed by `"key-" + primaryKeyValue`.
///
/// Ordered map, so diff output and snapshot serialization are
/// deterministic regardless of row fetch order.
pub type DocumentMap = BTreeMap<String, Document>;

/// One row together with its attached related rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(RowObject);

impl Document {
    /// Create a document from a flat row, attaching an empty `nested` map
    pub fn from_row(mut row: RowObject) -> Self {
        row.insert(NESTED_KEY.to_string(), Value::Object(RowObject::new()));
        Self(row)
    }

    /// Get a top-level field value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Attach a sub-document or sub-document array under `nested[name]`
    pub fn attach_nested(&mut self, name: impl Into<String>, value: Value) {
        if let Some(Value::Object(nested)) = self.0.get_mut(NESTED_KEY) {
            nested.insert(name.into(), value);
        }
    }

    /// Get an attached sub-document or array
    pub fn nested(&self, name: &str) -> Option<&Value> {
        match self.0.get(NESTED_KEY) {
            Some(Value::Object(nested)) => nested.get(name),
            _ => None,
        }
    }

    /// The document's top-level fields with `nested` removed.
    ///
    /// This is the view the diff engine compares: only scalar and
    /// parent-link columns decide "modified".
    pub fn flat_fields(&self) -> RowObject {
        let mut flat = self.0.clone();
        flat.remove(NESTED_KEY);
        flat
    }

    /// Structural inequality over the flat fields, ignoring `nested`
    pub fn differs_from(&self, other: &Document) -> bool {
        self.flat_fields() != other.flat_fields()
    }

    /// Borrow the underlying JSON object
    pub fn as_object(&self) -> &RowObject {
        &self.0
    }
}

/// Compute the document-map key for a primary-key value.
///
/// Scalars are rendered bare (`key-42`, `key-alice`, `key-null`); anything
/// non-scalar falls back to its compact JSON rendering.
pub fn document_key(pk_value: &Value) -> String {
    let rendered = match pk_value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("key-{rendered}")
}

/// The kind of change a [`ChangeRecord`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Key present only in the current map
    Added,
    /// Key present only in the previous map
    Removed,
    /// Key present in both, flat fields differ
    Modified,
}

/// One changed document: both full states attached, never a field delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// State at the previous snapshot (`None` = the row was added)
    pub previous: Option<Document>,
    /// State at the current run (`None` = the row was removed)
    pub current: Option<Document>,
}

impl ChangeRecord {
    /// Record an added row
    pub fn added(current: Document) -> Self {
        Self {
            previous: None,
            current: Some(current),
        }
    }

    /// Record a removed row
    pub fn removed(previous: Document) -> Self {
        Self {
            previous: Some(previous),
            current: None,
        }
    }

    /// Record a modified row
    pub fn modified(previous: Document, current: Document) -> Self {
        Self {
            previous: Some(previous),
            current: Some(current),
        }
    }

    /// The kind of change this record describes
    pub fn kind(&self) -> ChangeKind {
        match (&self.previous, &self.current) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            _ => ChangeKind::Modified,
        }
    }
}

/// The payload handed to sinks for one table's change set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePayload {
    /// Table name
    pub table: String,
    /// All change records from this run, current-side entries first
    pub items: Vec<ChangeRecord>,
    /// Detection timestamp (Unix epoch seconds)
    pub timestamp: i64,
}

impl ChangePayload {
    /// Create a payload stamped with the current time
    pub fn new(table: impl Into<String>, items: Vec<ChangeRecord>) -> Self {
        Self {
            table: table.into(),
            items,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether there is anything to deliver
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RowObject {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_document_key_rendering() {
        assert_eq!(document_key(&json!(42)), "key-42");
        assert_eq!(document_key(&json!("alice")), "key-alice");
        assert_eq!(document_key(&json!(null)), "key-null");
        assert_eq!(document_key(&json!(true)), "key-true");
    }

    #[test]
    fn test_from_row_attaches_empty_nested() {
        let doc = Document::from_row(row(&[("id", json!(1))]));
        assert_eq!(doc.field("id"), Some(&json!(1)));
        assert_eq!(doc.field(NESTED_KEY), Some(&json!({})));
    }

    #[test]
    fn test_attach_and_read_nested() {
        let mut doc = Document::from_row(row(&[("id", json!(1))]));
        doc.attach_nested("user_id", json!({"id": 7, "name": "Bob"}));
        assert_eq!(doc.nested("user_id").unwrap()["name"], json!("Bob"));
    }

    #[test]
    fn test_differs_ignores_nested() {
        let mut a = Document::from_row(row(&[("id", json!(1)), ("email", json!("a@x"))]));
        let mut b = a.clone();
        a.attach_nested("posts", json!([{"id": 10}]));
        b.attach_nested("posts", json!([{"id": 11}, {"id": 12}]));

        assert!(!a.differs_from(&b));

        let c = Document::from_row(row(&[("id", json!(1)), ("email", json!("b@x"))]));
        assert!(a.differs_from(&c));
    }

    #[test]
    fn test_change_record_kind() {
        let doc = Document::from_row(row(&[("id", json!(1))]));
        assert_eq!(ChangeRecord::added(doc.clone()).kind(), ChangeKind::Added);
        assert_eq!(
            ChangeRecord::removed(doc.clone()).kind(),
            ChangeKind::Removed
        );
        assert_eq!(
            ChangeRecord::modified(doc.clone(), doc).kind(),
            ChangeKind::Modified
        );
    }

    #[test]
    fn test_change_record_null_serialization() {
        let doc = Document::from_row(row(&[("id", json!(1))]));
        let json = serde_json::to_value(ChangeRecord::added(doc)).unwrap();
        assert_eq!(json["previous"], Value::Null);
        assert_eq!(json["current"]["id"], json!(1));
    }
}
