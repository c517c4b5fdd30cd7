//! Catalog boundary
//!
//! The metadata/query collaborator the core is built against: anything
//! that can expose a table's columns, foreign keys and primary key, and
//! fetch rows, can drive the poller. `driftwatch-mysql` implements this
//! over `INFORMATION_SCHEMA`; [`MemoryCatalog`] implements it over static
//! in-process tables for tests and embedded use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::document::RowObject;
use crate::error::Result;
use crate::field::{Column, JunctionLink};

/// One foreign-key constraint row, as reported by the engine's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Table the constraint is defined on
    pub table: String,
    /// Foreign-key column on that table
    pub column: String,
    /// Constraint name
    pub constraint: String,
    /// Referenced table
    pub referenced_table: String,
    /// Referenced column
    pub referenced_column: String,
}

impl ForeignKey {
    /// Create a foreign-key row
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        constraint: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            constraint: constraint.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}

/// Read access to a relational engine's metadata and rows.
///
/// The whole per-table pipeline is a sequential chain of these calls over
/// one shared connection handle; no transaction is taken across them, so a
/// materialized document can reflect a moving target when writes race a
/// run. That is an accepted limitation of the polling model.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// List all table names in the schema
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Ordered column list with vendor type strings
    async fn columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Foreign keys defined on `table`
    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>>;

    /// Foreign keys defined on *other* tables that reference `table`
    async fn referencing_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>>;

    /// The table's primary-key column name, if it declares one.
    ///
    /// Composite keys report their first column.
    async fn primary_key_column(&self, table: &str) -> Result<Option<String>>;

    /// Fetch all rows of a table as JSON objects
    async fn fetch_all(&self, table: &str) -> Result<Vec<RowObject>>;

    /// Fetch rows where `column = value`
    async fn fetch_matching(&self, table: &str, column: &str, value: &Value)
        -> Result<Vec<RowObject>>;

    /// Fetch target-table rows reachable through a junction table for the
    /// given local primary-key value (the two-hop join)
    async fn fetch_via_junction(&self, link: &JunctionLink, key: &Value)
        -> Result<Vec<RowObject>>;
}

/// A static table for [`MemoryCatalog`]
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    /// Ordered columns
    pub columns: Vec<Column>,
    /// Foreign keys defined on this table
    pub foreign_keys: Vec<ForeignKey>,
    /// Primary-key column, if any
    pub primary_key: Option<String>,
    /// Row data
    pub rows: Vec<RowObject>,
}

impl MemoryTable {
    /// Create an empty table definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column
    pub fn column(mut self, name: &str, type_name: &str) -> Self {
        self.columns.push(Column::new(name, type_name));
        self
    }

    /// Add a foreign key from `column` to `referenced_table.referenced_column`
    pub fn foreign_key(mut self, column: &str, referenced_table: &str, referenced_column: &str) -> Self {
        let constraint = format!("fk_{}_{}", column, referenced_table);
        self.foreign_keys.push(ForeignKey::new(
            String::new(), // filled in when inserted into the catalog
            column,
            constraint,
            referenced_table,
            referenced_column,
        ));
        self
    }

    /// Declare the primary key
    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = Some(column.to_string());
        self
    }

    /// Add a row
    pub fn row(mut self, row: RowObject) -> Self {
        self.rows.push(row);
        self
    }
}

/// In-memory [`Catalog`] over static table definitions.
///
/// Intended for tests and embedded use; insertion order is preserved for
/// `list_tables`.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    order: Vec<String>,
    tables: HashMap<String, MemoryTable>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table definition
    pub fn with_table(mut self, name: &str, mut table: MemoryTable) -> Self {
        for fk in &mut table.foreign_keys {
            fk.table = name.to_string();
        }
        self.order.push(name.to_string());
        self.tables.insert(name.to_string(), table);
        self
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| crate::error::Error::query(format!("unknown table: {name}")))
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.order.clone())
    }

    async fn columns(&self, table: &str) -> Result<Vec<Column>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn referencing_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let mut refs = Vec::new();
        for name in &self.order {
            let other = &self.tables[name];
            refs.extend(
                other
                    .foreign_keys
                    .iter()
                    .filter(|fk| fk.referenced_table == table)
                    .cloned(),
            );
        }
        Ok(refs)
    }

    async fn primary_key_column(&self, table: &str) -> Result<Option<String>> {
        Ok(self.table(table)?.primary_key.clone())
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<RowObject>> {
        Ok(self.table(table)?.rows.clone())
    }

    async fn fetch_matching(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<RowObject>> {
        Ok(self
            .table(table)?
            .rows
            .iter()
            .filter(|row| row.get(column) == Some(value))
            .cloned()
            .collect())
    }

    async fn fetch_via_junction(
        &self,
        link: &JunctionLink,
        key: &Value,
    ) -> Result<Vec<RowObject>> {
        let junction = self.table(&link.junction_table)?;
        let target = self.table(&link.target_table)?;

        let mut rows = Vec::new();
        for jrow in junction.rows.iter().filter(|r| r.get(&link.name) == Some(key)) {
            let Some(target_value) = jrow.get(&link.target_column) else {
                continue;
            };
            rows.extend(
                target
                    .rows
                    .iter()
                    .filter(|t| t.get(&link.target_key) == Some(target_value))
                    .cloned(),
            );
        }
        Ok(rows)
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

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_table(
                "users",
                MemoryTable::new()
                    .column("id", "int(11)")
                    .column("name", "varchar(255)")
                    .primary_key("id")
                    .row(row(&[("id", json!(1)), ("name", json!("Alice"))]))
                    .row(row(&[("id", json!(2)), ("name", json!("Bob"))])),
            )
            .with_table(
                "posts",
                MemoryTable::new()
                    .column("id", "int(11)")
                    .column("user_id", "int(11)")
                    .primary_key("id")
                    .foreign_key("user_id", "users", "id")
                    .row(row(&[("id", json!(10)), ("user_id", json!(1))])),
            )
    }

    #[tokio::test]
    async fn test_referencing_foreign_keys() {
        let cat = catalog();
        let refs = cat.referencing_foreign_keys("users").await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].table, "posts");
        assert_eq!(refs[0].column, "user_id");
    }

    #[tokio::test]
    async fn test_fetch_matching() {
        let cat = catalog();
        let rows = cat
            .fetch_matching("users", "id", &json!(2))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Bob"));
    }

    #[tokio::test]
    async fn test_fetch_via_junction() {
        let cat = MemoryCatalog::new()
            .with_table(
                "post_tags",
                MemoryTable::new()
                    .column("post_id", "int(11)")
                    .column("tag_id", "int(11)")
                    .row(row(&[("post_id", json!(10)), ("tag_id", json!(3))])),
            )
            .with_table(
                "tags",
                MemoryTable::new()
                    .column("id", "int(11)")
                    .column("label", "varchar(64)")
                    .primary_key("id")
                    .row(row(&[("id", json!(3)), ("label", json!("rust"))])),
            );

        let link = JunctionLink::new("post_id", "post_tags", "tag_id", "tags", "id");
        let rows = cat.fetch_via_junction(&link, &json!(10)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["label"], json!("rust"));
    }

    #[tokio::test]
    async fn test_unknown_table_is_query_error() {
        let cat = catalog();
        let err = cat.fetch_all("missing").await.unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Query);
    }
}
