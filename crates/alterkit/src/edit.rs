//! Collect pending edits from the editor store, one [`DatabaseEdit`] per database.

use crate::diff::{SchemaDiffResult, diff_schema};
use crate::{Error, Result};
use alterkit_model::SchemaSource;
use facet::Facet;
use indexmap::IndexMap;
use indexmap::map::Entry;

/// All pending changes for one database, submitted in one request.
///
/// On the wire the change lists sit next to `databaseId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct DatabaseEdit {
    pub database_id: i64,
    #[facet(flatten)]
    pub diff: SchemaDiffResult,
}

impl DatabaseEdit {
    pub fn new(database_id: i64, diff: SchemaDiffResult) -> Self {
        Self { database_id, diff }
    }

    /// Append the changes of another schema of the same database.
    pub fn merge(&mut self, diff: SchemaDiffResult) {
        self.diff.merge(diff);
    }

    /// Split off the changes, dropping the database id.
    pub fn into_diff(self) -> SchemaDiffResult {
        self.diff
    }

    pub fn change_count(&self) -> usize {
        self.diff.change_count()
    }
}

/// Diff every edited schema in the store against its origin and group the
/// results by database.
///
/// Databases come out in store order. Schemas without an origin snapshot are
/// not diffable yet and are skipped; schemas without changes contribute
/// nothing, so databases with no pending changes are absent from the result.
pub fn collect_database_edits(source: &impl SchemaSource) -> Result<Vec<DatabaseEdit>> {
    let mut edits: IndexMap<i64, DatabaseEdit> = IndexMap::new();

    for entry in source.databases() {
        let database = &entry.database;

        for schema in &entry.schema_list {
            let Some(origin) = entry.origin_schema(&schema.id) else {
                tracing::debug!(
                    database = %database.name,
                    schema = %schema.id,
                    "no origin snapshot, skipping schema"
                );
                continue;
            };

            let diff = diff_schema(&database.name, origin, schema);
            if !diff.has_changes() {
                continue;
            }

            let database_id = database
                .numeric_id()
                .map_err(|source| Error::InvalidDatabaseUid {
                    name: database.name.clone(),
                    uid: database.uid.clone(),
                    source,
                })?;

            tracing::debug!(
                database = %database.name,
                database_id,
                schema = %schema.id,
                changes = diff.change_count(),
                "collected schema changes"
            );

            match edits.entry(database_id) {
                Entry::Occupied(mut existing) => existing.get_mut().merge(diff),
                Entry::Vacant(slot) => {
                    slot.insert(DatabaseEdit::new(database_id, diff));
                }
            }
        }
    }

    Ok(edits.into_values().collect())
}
