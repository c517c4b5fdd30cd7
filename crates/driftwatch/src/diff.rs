//! Snapshot diff engine
//!
//! A side-effect-free set-diff by document key over two [`DocumentMap`]s.
//! Modifications are decided on the flat fields only — `nested` content is
//! excluded — and reported as one record carrying both full documents, not
//! a field-level delta.

use crate::document::{ChangeRecord, DocumentMap};

/// Compare the current document map against the previous snapshot.
///
/// Output order is fixed: all current-side records (modified and added, in
/// `current` iteration order) first, then all removed records (in
/// `previous` iteration order). `diff(a, a)` is always empty.
pub fn diff(current: &DocumentMap, previous: &DocumentMap) -> Vec<ChangeRecord> {
    let mut records = Vec::new();

    for (key, doc) in current {
        match previous.get(key) {
            Some(prev) => {
                if doc.differs_from(prev) {
                    records.push(ChangeRecord::modified(prev.clone(), doc.clone()));
                }
            }
            None => records.push(ChangeRecord::added(doc.clone())),
        }
    }

    for (key, prev) in previous {
        if !current.contains_key(key) {
            records.push(ChangeRecord::removed(prev.clone()));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChangeKind, Document, RowObject};
    use serde_json::{json, Value};

    fn doc(pairs: &[(&str, Value)]) -> Document {
        let row: RowObject = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Document::from_row(row)
    }

    fn map(entries: Vec<(&str, Document)>) -> DocumentMap {
        entries
            .into_iter()
            .map(|(k, d)| (k.to_string(), d))
            .collect()
    }

    #[test]
    fn test_diff_equal_maps_is_empty() {
        let a = map(vec![
            ("key-1", doc(&[("id", json!(1)), ("name", json!("a"))])),
            ("key-2", doc(&[("id", json!(2)), ("name", json!("b"))])),
        ]);
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn test_diff_detects_added() {
        let prev = map(vec![("key-1", doc(&[("id", json!(1))]))]);
        let curr = map(vec![
            ("key-1", doc(&[("id", json!(1))])),
            ("key-2", doc(&[("id", json!(2))])),
        ]);

        let records = diff(&curr, &prev);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), ChangeKind::Added);
        assert!(records[0].previous.is_none());
        assert_eq!(
            records[0].current.as_ref().unwrap().field("id"),
            Some(&json!(2))
        );
    }

    #[test]
    fn test_diff_detects_removed() {
        let prev = map(vec![
            ("key-1", doc(&[("id", json!(1))])),
            ("key-2", doc(&[("id", json!(2))])),
        ]);
        let curr = map(vec![("key-1", doc(&[("id", json!(1))]))]);

        let records = diff(&curr, &prev);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), ChangeKind::Removed);
        assert!(records[0].current.is_none());
    }

    #[test]
    fn test_diff_detects_modified_with_both_documents() {
        let prev = map(vec![(
            "key-1",
            doc(&[("id", json!(1)), ("email", json!("old@x"))]),
        )]);
        let curr = map(vec![(
            "key-1",
            doc(&[("id", json!(1)), ("email", json!("new@x"))]),
        )]);

        let records = diff(&curr, &prev);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), ChangeKind::Modified);
        assert_eq!(
            records[0].previous.as_ref().unwrap().field("email"),
            Some(&json!("old@x"))
        );
        assert_eq!(
            records[0].current.as_ref().unwrap().field("email"),
            Some(&json!("new@x"))
        );
    }

    #[test]
    fn test_diff_nested_change_is_not_a_change() {
        let mut with_nested = doc(&[("id", json!(1))]);
        with_nested.attach_nested("comments", json!([{"id": 5}]));
        let mut other_nested = doc(&[("id", json!(1))]);
        other_nested.attach_nested("comments", json!([{"id": 5}, {"id": 6}]));

        let prev = map(vec![("key-1", with_nested)]);
        let curr = map(vec![("key-1", other_nested)]);

        assert!(diff(&curr, &prev).is_empty());
    }

    #[test]
    fn test_diff_completeness_and_order() {
        // prev: 1 (will be modified), 2 (will be removed), 3 (unchanged)
        // curr: 1 (modified), 3 (unchanged), 4 (added)
        let prev = map(vec![
            ("key-1", doc(&[("id", json!(1)), ("v", json!("a"))])),
            ("key-2", doc(&[("id", json!(2))])),
            ("key-3", doc(&[("id", json!(3))])),
        ]);
        let curr = map(vec![
            ("key-1", doc(&[("id", json!(1)), ("v", json!("b"))])),
            ("key-3", doc(&[("id", json!(3))])),
            ("key-4", doc(&[("id", json!(4))])),
        ]);

        let records = diff(&curr, &prev);
        assert_eq!(records.len(), 3);

        // Current-side records first (map iteration order), removals last.
        assert_eq!(records[0].kind(), ChangeKind::Modified);
        assert_eq!(records[1].kind(), ChangeKind::Added);
        assert_eq!(records[2].kind(), ChangeKind::Removed);
    }

    #[test]
    fn test_diff_against_empty_previous() {
        let prev = DocumentMap::new();
        let curr = map(vec![
            ("key-1", doc(&[("id", json!(1))])),
            ("key-2", doc(&[("id", json!(2))])),
        ]);

        let records = diff(&curr, &prev);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind() == ChangeKind::Added));
    }
}
