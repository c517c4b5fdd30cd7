//! Relational field model
//!
//! Value objects describing one table's relational shape: scalar columns,
//! foreign-key links to a single parent row, links from child tables, and
//! links reached through a junction table. The classifier produces these,
//! the materializer consumes them.

use serde::{Deserialize, Serialize};

/// A scalar column: name plus the vendor type string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// SQL type name (vendor-specific, e.g. `int(11)`, `varchar(255)`)
    pub type_name: String,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A single-hop foreign-key link.
///
/// For a parent link, `name` is the local foreign-key column and
/// `foreign_key` is the referenced column on `foreign_table`. For a
/// one-to-many child link, `name` is the foreign-key column *on the child
/// table* pointing back at this table, and `foreign_key` is the child
/// table's own primary-key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedField {
    /// Foreign-key column name (local for parents, remote for children)
    pub name: String,
    /// The table on the other end of the link
    pub foreign_table: String,
    /// Key column on the other table completing the link
    pub foreign_key: String,
}

impl LinkedField {
    /// Create a new linked field
    pub fn new(
        name: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            foreign_table: foreign_table.into(),
            foreign_key: foreign_key.into(),
        }
    }
}

/// A two-hop link through a junction table (many-to-many).
///
/// Join path: local primary key → `junction_table.name` →
/// `junction_table.target_column` → `target_table.target_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionLink {
    /// Junction column pointing back at the local table
    pub name: String,
    /// The junction (bridge) table
    pub junction_table: String,
    /// Junction column pointing at the final target table
    pub target_column: String,
    /// The final target table
    pub target_table: String,
    /// Key column on the target table completing the join
    pub target_key: String,
}

impl JunctionLink {
    /// Create a new junction link
    pub fn new(
        name: impl Into<String>,
        junction_table: impl Into<String>,
        target_column: impl Into<String>,
        target_table: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            junction_table: junction_table.into(),
            target_column: target_column.into(),
            target_table: target_table.into(),
            target_key: target_key.into(),
        }
    }
}

/// The classifier's verdict for a single foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    /// This table holds the foreign key; the other table is a parent
    Parent(LinkedField),
    /// Another table holds a foreign key back at this table
    OneToMany(LinkedField),
    /// Another table is linked through a junction table
    ManyToMany(JunctionLink),
}

/// The resolved primary key of a table.
///
/// Always one of the table's own fields: either a primitive column or a
/// parent-link column doubling as the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimaryKey {
    /// Primary key is a plain scalar column
    Column(Column),
    /// Primary key is a foreign-key column (the parent link is the key)
    Parent(LinkedField),
}

impl PrimaryKey {
    /// The primary-key column name
    pub fn name(&self) -> &str {
        match self {
            Self::Column(c) => &c.name,
            Self::Parent(l) => &l.name,
        }
    }
}

/// Full relational descriptor for one table at one point in time.
///
/// Rebuilt fresh on every run; never cached across runs, since the schema
/// may have changed in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Resolved primary key
    pub primary_key: PrimaryKey,
    /// Scalar columns (everything not covered by a local foreign key)
    pub primitive_fields: Vec<Column>,
    /// Local foreign keys (parents)
    pub parent_fields: Vec<LinkedField>,
    /// Child tables referencing this table directly
    pub one_to_many_fields: Vec<LinkedField>,
    /// Tables linked through a junction table
    pub many_to_many_fields: Vec<JunctionLink>,
}

impl TableDescriptor {
    /// Whether the table has any relations to attach during materialization
    pub fn has_relations(&self) -> bool {
        !self.parent_fields.is_empty()
            || !self.one_to_many_fields.is_empty()
            || !self.many_to_many_fields.is_empty()
    }

    /// All column names covered by the descriptor (primitives + parent links)
    pub fn column_names(&self) -> Vec<&str> {
        self.primitive_fields
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.parent_fields.iter().map(|l| l.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_name() {
        let pk = PrimaryKey::Column(Column::new("id", "int(11)"));
        assert_eq!(pk.name(), "id");

        let pk = PrimaryKey::Parent(LinkedField::new("user_id", "users", "id"));
        assert_eq!(pk.name(), "user_id");
    }

    #[test]
    fn test_descriptor_column_names() {
        let desc = TableDescriptor {
            name: "posts".into(),
            primary_key: PrimaryKey::Column(Column::new("id", "int(11)")),
            primitive_fields: vec![Column::new("id", "int(11)"), Column::new("title", "text")],
            parent_fields: vec![LinkedField::new("user_id", "users", "id")],
            one_to_many_fields: vec![],
            many_to_many_fields: vec![],
        };

        assert_eq!(desc.column_names(), vec!["id", "title", "user_id"]);
        assert!(desc.has_relations());
    }

    #[test]
    fn test_relation_serde_tagging() {
        let rel = Relation::ManyToMany(JunctionLink::new(
            "post_id", "post_tags", "tag_id", "tags", "id",
        ));
        let json = serde_json::to_string(&rel).unwrap();
        assert!(json.contains("\"kind\":\"many_to_many\""));
        assert!(json.contains("post_tags"));

        let parsed: Relation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rel);
    }
}
