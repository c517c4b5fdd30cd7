//! Relationship classifier
//!
//! Decides, from raw foreign-key metadata, how each relationship around a
//! table materializes: the table holds a foreign key (parent), another
//! table points back at it directly (one-to-many), or another table is
//! reachable through a junction table (many-to-many).

use tracing::warn;

use crate::catalog::{Catalog, ForeignKey};
use crate::error::Result;
use crate::field::{JunctionLink, LinkedField, Relation};

/// The junction-table heuristic.
///
/// A referencing table qualifies as a pure junction iff it has exactly two
/// foreign-key columns and no more than one non-key column (a surrogate id
/// or timestamp is tolerated).
pub fn is_junction_table(foreign_key_count: usize, column_count: usize) -> bool {
    foreign_key_count == 2 && (column_count == 2 || column_count == 3)
}

/// Classified relationships for one table
#[derive(Debug, Default)]
pub struct Relationships {
    /// Foreign keys this table holds
    pub parents: Vec<LinkedField>,
    /// Tables pointing back at this table directly
    pub one_to_many: Vec<LinkedField>,
    /// Tables reachable through a junction table
    pub many_to_many: Vec<JunctionLink>,
}

impl Relationships {
    fn push(&mut self, relation: Relation) {
        match relation {
            Relation::Parent(link) => self.parents.push(link),
            Relation::OneToMany(link) => self.one_to_many.push(link),
            Relation::ManyToMany(link) => self.many_to_many.push(link),
        }
    }
}

/// Classifies foreign keys against catalog metadata
pub struct Classifier<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> Classifier<'a> {
    /// Create a classifier over a catalog
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Classify every relationship around `table`.
    ///
    /// Unresolvable relations (a child table without a primary key, a
    /// junction without exactly one candidate far-side foreign key) are
    /// skipped with a warning; they never abort the table.
    pub async fn classify(&self, table: &str) -> Result<Relationships> {
        let mut relationships = Relationships::default();

        for fk in self.catalog.foreign_keys(table).await? {
            relationships.push(Relation::Parent(LinkedField::new(
                fk.column,
                fk.referenced_table,
                fk.referenced_column,
            )));
        }

        for fk in self.catalog.referencing_foreign_keys(table).await? {
            if let Some(relation) = self.classify_external(table, &fk).await? {
                relationships.push(relation);
            }
        }

        Ok(relationships)
    }

    /// Classify a single foreign key defined on another table.
    ///
    /// Returns `None` when the relation is unsupported and must be skipped.
    async fn classify_external(&self, table: &str, fk: &ForeignKey) -> Result<Option<Relation>> {
        let junction_fks = self.catalog.foreign_keys(&fk.table).await?;
        let column_count = self.catalog.columns(&fk.table).await?.len();

        if is_junction_table(junction_fks.len(), column_count) {
            // The far side of the junction is whatever foreign key does not
            // come back through the column we arrived on.
            let candidates: Vec<&ForeignKey> = junction_fks
                .iter()
                .filter(|other| other.column != fk.column)
                .collect();

            if candidates.len() != 1 {
                warn!(
                    table,
                    junction = %fk.table,
                    candidates = candidates.len(),
                    "ambiguous junction table, skipping relation"
                );
                return Ok(None);
            }
            let far = candidates[0];

            return Ok(Some(Relation::ManyToMany(JunctionLink::new(
                fk.column.clone(),
                fk.table.clone(),
                far.column.clone(),
                far.referenced_table.clone(),
                far.referenced_column.clone(),
            ))));
        }

        // One-to-many: complete the link with the child table's own key.
        match self.catalog.primary_key_column(&fk.table).await? {
            Some(child_key) => Ok(Some(Relation::OneToMany(LinkedField::new(
                fk.column.clone(),
                fk.table.clone(),
                child_key,
            )))),
            None => {
                warn!(
                    table,
                    child = %fk.table,
                    "child table has no primary key, skipping relation"
                );
                Ok(None)
            }
        }
    }
}
