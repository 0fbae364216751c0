//! Wire shapes consumed by the backend edit API.
//!
//! Each context is built from a snapshot [`Column`] or [`Table`]. Unset
//! string fields become `""` and an unset `nullable` becomes `false`, with one
//! exception: an unset `default` stays unset and is omitted from the payload,
//! since "no default" and "empty-string default" are different column
//! definitions.

use alterkit_model::{Column, Table};
use facet::Facet;

/// Add a column to an existing table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct AddColumnContext {
    pub name: String,
    #[facet(rename = "type")]
    pub column_type: String,
    pub comment: String,
    pub nullable: bool,
    #[facet(default, skip_serializing_if = Option::is_none)]
    pub default: Option<String>,
    pub character_set: String,
    pub collation: String,
}

impl AddColumnContext {
    pub fn from_column(column: &Column) -> Self {
        Self {
            name: column.name.clone().unwrap_or_default(),
            column_type: column.column_type.clone().unwrap_or_default(),
            comment: column.comment(),
            nullable: column.nullable.unwrap_or(false),
            default: column.default.clone(),
            // The snapshot model has no per-column charset or collation.
            character_set: String::new(),
            collation: String::new(),
        }
    }
}

impl From<&Column> for AddColumnContext {
    fn from(column: &Column) -> Self {
        Self::from_column(column)
    }
}

/// Change an existing column in place, including renames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ChangeColumnContext {
    pub old_name: String,
    pub new_name: String,
    #[facet(rename = "type")]
    pub column_type: String,
    pub comment: String,
    pub nullable: bool,
    #[facet(default, skip_serializing_if = Option::is_none)]
    pub default: Option<String>,
    pub character_set: String,
    pub collation: String,
}

impl ChangeColumnContext {
    /// Build a change from the origin column to its edited counterpart.
    pub fn new(origin: &Column, column: &Column) -> Self {
        Self {
            old_name: origin.name.clone().unwrap_or_default(),
            new_name: column.name.clone().unwrap_or_default(),
            column_type: column.column_type.clone().unwrap_or_default(),
            comment: column.comment(),
            nullable: column.nullable.unwrap_or(false),
            default: column.default.clone(),
            character_set: String::new(),
            collation: String::new(),
        }
    }

    pub fn is_rename(&self) -> bool {
        self.old_name != self.new_name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct DropColumnContext {
    pub name: String,
}

impl DropColumnContext {
    pub fn from_column(column: &Column) -> Self {
        Self {
            name: column.name.clone().unwrap_or_default(),
        }
    }
}

/// Primary key definition on a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct PrimaryKeyContext {
    pub column_list: Vec<String>,
}

/// Foreign key definition on a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct AddForeignKeyContext {
    pub column_list: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column_list: Vec<String>,
}

/// Create a new table.
///
/// Column, primary key and foreign key lists are left empty here; they are
/// filled in by the statement generator on the backend side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct CreateTableContext {
    pub schema: String,
    pub name: String,
    pub engine: String,
    pub collation: String,
    pub comment: String,
    pub add_column_list: Vec<AddColumnContext>,
    pub primary_key_list: Vec<PrimaryKeyContext>,
    pub add_foreign_key_list: Vec<AddForeignKeyContext>,
    pub character_set: String,
}

impl CreateTableContext {
    pub fn new(schema: &str, table: &Table) -> Self {
        Self {
            schema: schema.to_string(),
            name: table.name.clone().unwrap_or_default(),
            engine: table.engine.clone().unwrap_or_default(),
            collation: table.collation.clone().unwrap_or_default(),
            comment: table.comment.clone().unwrap_or_default(),
            add_column_list: Vec::new(),
            primary_key_list: Vec::new(),
            add_foreign_key_list: Vec::new(),
            // No table-level charset in the snapshot model.
            character_set: String::new(),
        }
    }
}

/// Column-level changes to one existing table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct AlterTableContext {
    pub schema: String,
    /// Table name after any rename in the same edit
    pub name: String,
    pub add_column_list: Vec<AddColumnContext>,
    pub change_column_list: Vec<ChangeColumnContext>,
    pub drop_column_list: Vec<DropColumnContext>,
}

impl AlterTableContext {
    pub fn new(schema: &str, table: &Table) -> Self {
        Self {
            schema: schema.to_string(),
            name: table.name.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add_column_list.is_empty()
            && self.change_column_list.is_empty()
            && self.drop_column_list.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.add_column_list.len() + self.change_column_list.len() + self.drop_column_list.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct RenameTableContext {
    pub schema: String,
    pub old_name: String,
    pub new_name: String,
}

impl RenameTableContext {
    pub fn new(schema: &str, origin: &Table, table: &Table) -> Self {
        Self {
            schema: schema.to_string(),
            old_name: origin.name.clone().unwrap_or_default(),
            new_name: table.name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct DropTableContext {
    pub schema: String,
    pub name: String,
}

impl DropTableContext {
    pub fn new(schema: &str, table: &Table) -> Self {
        Self {
            schema: schema.to_string(),
            name: table.name.clone().unwrap_or_default(),
        }
    }
}
