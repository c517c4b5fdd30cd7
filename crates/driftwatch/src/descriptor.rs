//! Table descriptor builder
//!
//! Orchestrates the classifier into a full [`TableDescriptor`]: the column
//! partition (primitive vs parent-link), the resolved primary key, and the
//! classified child/junction relations. Descriptors are rebuilt on every
//! run so a schema change between runs is picked up automatically.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::classify::Classifier;
use crate::error::Result;
use crate::field::{PrimaryKey, TableDescriptor};

/// Builds table descriptors from catalog metadata
pub struct DescriptorBuilder<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> DescriptorBuilder<'a> {
    /// Create a builder over a catalog
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Build the descriptor for one table.
    ///
    /// Returns `Ok(None)` for tables the poller cannot support — no
    /// declared primary key, or a key column that resolves to neither a
    /// primitive nor a parent-link field. That is an expected outcome the
    /// caller logs and skips, not an error.
    pub async fn build(&self, table: &str) -> Result<Option<TableDescriptor>> {
        let Some(key_column) = self.catalog.primary_key_column(table).await? else {
            warn!(table, "no primary key, skipping table");
            return Ok(None);
        };

        let columns = self.catalog.columns(table).await?;
        let relationships = Classifier::new(self.catalog).classify(table).await?;

        // A column is primitive iff it is not claimed by a local foreign key.
        let parent_columns: HashSet<&str> = relationships
            .parents
            .iter()
            .map(|link| link.name.as_str())
            .collect();
        let primitive_fields: Vec<_> = columns
            .into_iter()
            .filter(|column| !parent_columns.contains(column.name.as_str()))
            .collect();

        let primary_key = primitive_fields
            .iter()
            .find(|column| column.name == key_column)
            .cloned()
            .map(PrimaryKey::Column)
            .or_else(|| {
                relationships
                    .parents
                    .iter()
                    .find(|link| link.name == key_column)
                    .cloned()
                    .map(PrimaryKey::Parent)
            });

        let Some(primary_key) = primary_key else {
            warn!(table, key_column = %key_column, "primary key column not resolvable, skipping table");
            return Ok(None);
        };

        debug!(
            table,
            primitives = primitive_fields.len(),
            parents = relationships.parents.len(),
            children = relationships.one_to_many.len(),
            junctions = relationships.many_to_many.len(),
            "built table descriptor"
        );

        Ok(Some(TableDescriptor {
            name: table.to_string(),
            primary_key,
            primitive_fields,
            parent_fields: relationships.parents,
            one_to_many_fields: relationships.one_to_many,
            many_to_many_fields: relationships.many_to_many,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, MemoryTable};
    use std::collections::HashSet as Set;

    fn blog_catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_table(
                "users",
                MemoryTable::new()
                    .column("id", "int(11)")
                    .column("email", "varchar(255)")
                    .primary_key("id"),
            )
            .with_table(
                "posts",
                MemoryTable::new()
                    .column("id", "int(11)")
                    .column("title", "varchar(255)")
                    .column("user_id", "int(11)")
                    .primary_key("id")
                    .foreign_key("user_id", "users", "id"),
            )
            .with_table(
                "sessions",
                MemoryTable::new()
                    .column("token", "varchar(128)")
                    .column("user_id", "int(11)")
                    .foreign_key("user_id", "users", "id"),
            )
    }

    #[tokio::test]
    async fn test_column_partition() {
        let catalog = blog_catalog();
        let desc = DescriptorBuilder::new(&catalog)
            .build("posts")
            .await
            .unwrap()
            .unwrap();

        // primitive ∪ parent covers every column exactly once.
        let primitives: Set<&str> = desc
            .primitive_fields
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        let parents: Set<&str> = desc.parent_fields.iter().map(|l| l.name.as_str()).collect();

        assert_eq!(primitives, Set::from(["id", "title"]));
        assert_eq!(parents, Set::from(["user_id"]));
        assert!(primitives.is_disjoint(&parents));
    }

    #[tokio::test]
    async fn test_primary_key_resolves_to_primitive() {
        let catalog = blog_catalog();
        let desc = DescriptorBuilder::new(&catalog)
            .build("posts")
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(desc.primary_key, PrimaryKey::Column(ref c) if c.name == "id"));
    }

    #[tokio::test]
    async fn test_primary_key_resolves_to_parent_link() {
        // profiles.user_id is both the primary key and a foreign key.
        let catalog = MemoryCatalog::new()
            .with_table(
                "users",
                MemoryTable::new().column("id", "int(11)").primary_key("id"),
            )
            .with_table(
                "profiles",
                MemoryTable::new()
                    .column("user_id", "int(11)")
                    .column("bio", "text")
                    .primary_key("user_id")
                    .foreign_key("user_id", "users", "id"),
            );

        let desc = DescriptorBuilder::new(&catalog)
            .build("profiles")
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(desc.primary_key, PrimaryKey::Parent(ref l) if l.name == "user_id"));
        assert_eq!(desc.primitive_fields.len(), 1); // bio only
    }

    #[tokio::test]
    async fn test_table_without_primary_key_is_unsupported() {
        let catalog = blog_catalog();
        let desc = DescriptorBuilder::new(&catalog).build("sessions").await.unwrap();
        assert!(desc.is_none());
    }
}
