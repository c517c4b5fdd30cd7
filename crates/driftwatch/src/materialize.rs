//! Row materializer
//!
//! Turns a [`TableDescriptor`] into a [`DocumentMap`]: every row of the
//! table as a flat document, with its parent rows, direct children and
//! junction-linked rows attached under `nested`. One relation fetch per
//! row per relation — intentionally simple; batching would not change the
//! observable result.

use serde_json::Value;
use tracing::debug;

use crate::catalog::Catalog;
use crate::document::{document_key, Document, DocumentMap};
use crate::error::Result;
use crate::field::TableDescriptor;

/// Materializes table rows into nested documents
pub struct Materializer<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> Materializer<'a> {
    /// Create a materializer over a catalog
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Fetch all rows of the described table and attach their relations.
    ///
    /// Attachment order per document: parents, then one-to-many children,
    /// then many-to-many targets. A parent lookup with no match (dangling
    /// or NULL foreign key) attaches nothing; child and junction relations
    /// always attach an array, possibly empty.
    pub async fn materialize(&self, descriptor: &TableDescriptor) -> Result<DocumentMap> {
        let rows = self.catalog.fetch_all(&descriptor.name).await?;
        let mut documents = DocumentMap::new();

        for row in rows {
            let pk_value = row
                .get(descriptor.primary_key.name())
                .cloned()
                .unwrap_or(Value::Null);
            let mut document = Document::from_row(row);

            for link in &descriptor.parent_fields {
                let local_value = document.field(&link.name).cloned().unwrap_or(Value::Null);
                if local_value.is_null() {
                    continue;
                }
                let parents = self
                    .catalog
                    .fetch_matching(&link.foreign_table, &link.foreign_key, &local_value)
                    .await?;
                if let Some(parent) = parents.into_iter().next() {
                    document.attach_nested(link.name.clone(), Value::Object(parent));
                }
            }

            for link in &descriptor.one_to_many_fields {
                let children = self
                    .catalog
                    .fetch_matching(&link.foreign_table, &link.name, &pk_value)
                    .await?;
                document.attach_nested(
                    link.foreign_table.clone(),
                    Value::Array(children.into_iter().map(Value::Object).collect()),
                );
            }

            for link in &descriptor.many_to_many_fields {
                let targets = self.catalog.fetch_via_junction(link, &pk_value).await?;
                document.attach_nested(
                    link.target_table.clone(),
                    Value::Array(targets.into_iter().map(Value::Object).collect()),
                );
            }

            documents.insert(document_key(&pk_value), document);
        }

        debug!(
            table = %descriptor.name,
            documents = documents.len(),
            "materialized table"
        );

        Ok(documents)
    }
}
