//! Schema snapshot types for alterkit.
//!
//! The schema editor keeps two snapshots of every schema it manages: the
//! *origin* (the last state known to be persisted) and the *edited* working
//! copy the user mutates. This crate holds both shapes plus the read-only
//! [`SchemaSource`] seam the edit pipeline reads them through.
//!
//! Editor working copies can carry unset fields (a freshly added column has no
//! type until the user picks one), so user-editable fields are optional here.
//! Identity is carried by `id`, which stays stable across renames.

use facet::Facet;
use indexmap::IndexMap;
use std::num::ParseIntError;

/// A column in a table snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct Column {
    /// Stable identity within the table
    pub id: String,
    /// Column name
    #[facet(default)]
    pub name: Option<String>,
    /// SQL type as typed by the user (e.g. `int`, `varchar(255)`)
    #[facet(default, rename = "type")]
    pub column_type: Option<String>,
    /// Whether the column accepts NULL
    #[facet(default)]
    pub nullable: Option<bool>,
    /// Default value expression; `None` means "no default", not empty
    #[facet(default)]
    pub default: Option<String>,
    /// Data classification tag
    #[facet(default)]
    pub classification: Option<String>,
    /// Free-form comment entered by the user
    #[facet(default)]
    pub user_comment: Option<String>,
}

impl Column {
    /// Create a column with a name and type, not nullable and without default.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        column_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            column_type: Some(column_type.into()),
            nullable: Some(false),
            ..Default::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn with_user_comment(mut self, comment: impl Into<String>) -> Self {
        self.user_comment = Some(comment.into());
        self
    }

    /// The comment stored in the database: classification and user comment,
    /// empty parts dropped, joined with `-`.
    pub fn comment(&self) -> String {
        [self.classification.as_deref(), self.user_comment.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// A table snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct Table {
    /// Stable identity within the schema
    pub id: String,
    #[facet(default)]
    pub name: Option<String>,
    /// Storage engine (MySQL-style engines only)
    #[facet(default)]
    pub engine: Option<String>,
    #[facet(default)]
    pub collation: Option<String>,
    #[facet(default)]
    pub comment: Option<String>,
    /// Columns in definition order
    #[facet(default)]
    pub columns: Vec<Column>,
}

impl Table {
    /// Create an empty table with the given name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Look up a column by identity.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }
}

/// A schema snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct Schema {
    pub id: String,
    /// Schema name; empty for engines without schemas (MySQL)
    #[facet(default)]
    pub name: String,
    #[facet(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Look up a table by identity.
    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }
}

/// A database known to the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct Database {
    /// Resource id used as the store key
    pub id: String,
    /// Backend database id, as a decimal string
    pub uid: String,
    pub name: String,
}

impl Database {
    pub fn new(id: impl Into<String>, uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            name: name.into(),
        }
    }

    /// The backend's numeric id for this database.
    pub fn numeric_id(&self) -> Result<i64, ParseIntError> {
        self.uid.trim().parse()
    }
}

/// Everything the editor holds for one database: the edited schemas and
/// their origin snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct DatabaseSchema {
    pub database: Database,
    /// Edited working copies
    #[facet(default)]
    pub schema_list: Vec<Schema>,
    /// Baseline snapshots, correlated with `schema_list` by schema id
    #[facet(default)]
    pub origin_schema_list: Vec<Schema>,
}

impl DatabaseSchema {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            schema_list: Vec::new(),
            origin_schema_list: Vec::new(),
        }
    }

    /// Register a schema whose origin and edited snapshots start out equal.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.origin_schema_list.push(schema.clone());
        self.schema_list.push(schema);
        self
    }

    /// Register an origin snapshot together with its edited copy.
    pub fn with_edited_schema(mut self, origin: Schema, edited: Schema) -> Self {
        self.origin_schema_list.push(origin);
        self.schema_list.push(edited);
        self
    }

    /// Find the origin snapshot for the schema with the given id.
    pub fn origin_schema(&self, id: &str) -> Option<&Schema> {
        self.origin_schema_list.iter().find(|s| s.id == id)
    }

    /// Mutable access to the edited copy of a schema.
    pub fn edited_schema_mut(&mut self, id: &str) -> Option<&mut Schema> {
        self.schema_list.iter_mut().find(|s| s.id == id)
    }
}

/// Read-only access to the editor's schema state.
pub trait SchemaSource {
    /// All databases, in the order the editor opened them.
    fn databases(&self) -> impl Iterator<Item = &DatabaseSchema>;
}

/// On-disk shape of an editor store dump.
#[derive(Debug, Clone, Default, Facet)]
pub struct StoreSnapshot {
    #[facet(default)]
    pub databases: Vec<DatabaseSchema>,
}

/// Errors from loading an editor store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to decode store snapshot: {0}")]
    Decode(String),
}

/// In-memory editor store, keyed by database id in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EditorStore {
    databases: IndexMap<String, DatabaseSchema>,
}

impl EditorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a database, replacing any previous entry with the same id.
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, entry: DatabaseSchema) -> Option<DatabaseSchema> {
        self.databases.insert(entry.database.id.clone(), entry)
    }

    pub fn get(&self, id: &str) -> Option<&DatabaseSchema> {
        self.databases.get(id)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    /// Load a store from a JSON dump (see [`StoreSnapshot`]).
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: StoreSnapshot =
            facet_json::from_str(json).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(snapshot.into())
    }
}

impl From<StoreSnapshot> for EditorStore {
    fn from(snapshot: StoreSnapshot) -> Self {
        snapshot.databases.into_iter().collect()
    }
}

impl FromIterator<DatabaseSchema> for EditorStore {
    fn from_iter<I: IntoIterator<Item = DatabaseSchema>>(iter: I) -> Self {
        let mut store = EditorStore::new();
        for entry in iter {
            store.insert(entry);
        }
        store
    }
}

impl SchemaSource for EditorStore {
    fn databases(&self) -> impl Iterator<Item = &DatabaseSchema> {
        self.databases.values()
    }
}
