//! Schema diffing - compare an edited schema snapshot against its origin.
//!
//! [`diff_schema`] walks the edited snapshot and classifies every table and
//! column against the origin snapshot, matching them by `id` so renames are
//! recognized as renames rather than a drop followed by an add:
//!
//! - a table with no origin counterpart is created,
//! - a table whose name changed is renamed,
//! - columns are added, changed or dropped on tables present in both,
//! - origin tables missing from the edited snapshot are dropped.
//!
//! The result is a pure function of the two snapshots.
//!
//! ## Merging
//!
//! One database can have several schemas. Their diffs are folded into one
//! result with [`merge_diff_results`], which concatenates each change list in
//! input order.
//!
//! ```text
//! ~ rename users -> user
//! user:
//!   + email: varchar(255)
//!   ~ age: bigint
//!   - nickname
//! - table legacy_sessions
//! ```

use crate::context::{
    AddColumnContext, AlterTableContext, ChangeColumnContext, CreateTableContext,
    DropColumnContext, DropTableContext, RenameTableContext,
};
use alterkit_model::{Column, Schema, Table};
use facet::Facet;
use std::fmt;

/// Changes found in one schema, or several merged schemas of one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct SchemaDiffResult {
    pub create_table_list: Vec<CreateTableContext>,
    pub alter_table_list: Vec<AlterTableContext>,
    pub rename_table_list: Vec<RenameTableContext>,
    pub drop_table_list: Vec<DropTableContext>,
}

impl SchemaDiffResult {
    /// Returns true if the diff contains at least one change.
    pub fn has_changes(&self) -> bool {
        !self.create_table_list.is_empty()
            || !self.alter_table_list.is_empty()
            || !self.rename_table_list.is_empty()
            || !self.drop_table_list.is_empty()
    }

    /// Count total number of changes, counting each column change separately.
    pub fn change_count(&self) -> usize {
        self.create_table_list.len()
            + self.rename_table_list.len()
            + self.drop_table_list.len()
            + self
                .alter_table_list
                .iter()
                .map(AlterTableContext::change_count)
                .sum::<usize>()
    }

    /// Append every change list of `other` after this one's.
    pub fn merge(&mut self, other: SchemaDiffResult) {
        let SchemaDiffResult {
            create_table_list,
            alter_table_list,
            rename_table_list,
            drop_table_list,
        } = other;

        self.create_table_list.extend(create_table_list);
        self.alter_table_list.extend(alter_table_list);
        self.rename_table_list.extend(rename_table_list);
        self.drop_table_list.extend(drop_table_list);
    }
}

/// Fold several diff results into one, preserving input order.
pub fn merge_diff_results(
    results: impl IntoIterator<Item = SchemaDiffResult>,
) -> SchemaDiffResult {
    results
        .into_iter()
        .fold(SchemaDiffResult::default(), |mut acc, result| {
            acc.merge(result);
            acc
        })
}

/// Compare the edited snapshot of a schema against its origin.
///
/// Both snapshots are expected to describe the same schema (same `id`). The
/// schema ids are not compared; callers pair snapshots by id before diffing.
pub fn diff_schema(database_name: &str, origin: &Schema, edited: &Schema) -> SchemaDiffResult {
    let schema = edited.name.as_str();
    let mut result = SchemaDiffResult::default();

    for table in &edited.tables {
        let Some(origin_table) = origin.table(&table.id) else {
            result
                .create_table_list
                .push(CreateTableContext::new(schema, table));
            continue;
        };

        if origin_table.name != table.name {
            result
                .rename_table_list
                .push(RenameTableContext::new(schema, origin_table, table));
        }

        let alter = diff_table(schema, origin_table, table);
        if !alter.is_empty() {
            result.alter_table_list.push(alter);
        }
    }

    for origin_table in &origin.tables {
        if edited.table(&origin_table.id).is_none() {
            result
                .drop_table_list
                .push(DropTableContext::new(schema, origin_table));
        }
    }

    tracing::trace!(
        database = database_name,
        schema = %edited.id,
        changes = result.change_count(),
        "diffed schema"
    );

    result
}

/// Diff the columns of two snapshots of the same table.
fn diff_table(schema: &str, origin: &Table, table: &Table) -> AlterTableContext {
    let mut alter = AlterTableContext::new(schema, table);

    for column in &table.columns {
        match origin.column(&column.id) {
            None => alter
                .add_column_list
                .push(AddColumnContext::from_column(column)),
            Some(origin_column) if column_changed(origin_column, column) => alter
                .change_column_list
                .push(ChangeColumnContext::new(origin_column, column)),
            Some(_) => {}
        }
    }

    for origin_column in &origin.columns {
        if table.column(&origin_column.id).is_none() {
            alter
                .drop_column_list
                .push(DropColumnContext::from_column(origin_column));
        }
    }

    alter
}

/// Whether any tracked field of a column differs between snapshots.
fn column_changed(origin: &Column, column: &Column) -> bool {
    origin.name != column.name
        || origin.column_type != column.column_type
        || origin.nullable != column.nullable
        || origin.default != column.default
        || origin.comment() != column.comment()
}

fn qualified(schema: &str, name: &str) -> String {
    if schema.is_empty() {
        name.to_string()
    } else {
        format!("{schema}.{name}")
    }
}

impl fmt::Display for SchemaDiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return write!(f, "No changes detected.");
        }

        let mut lines = Vec::new();
        for create in &self.create_table_list {
            lines.push(format!("+ table {}", qualified(&create.schema, &create.name)));
        }
        for rename in &self.rename_table_list {
            lines.push(format!(
                "~ rename {} -> {}",
                qualified(&rename.schema, &rename.old_name),
                rename.new_name
            ));
        }
        for alter in &self.alter_table_list {
            lines.push(format!("{}:", qualified(&alter.schema, &alter.name)));
            for add in &alter.add_column_list {
                let nullable = if add.nullable { " (nullable)" } else { "" };
                lines.push(format!("  + {}: {}{}", add.name, add.column_type, nullable));
            }
            for change in &alter.change_column_list {
                if change.is_rename() {
                    lines.push(format!(
                        "  ~ {} -> {}: {}",
                        change.old_name, change.new_name, change.column_type
                    ));
                } else {
                    lines.push(format!("  ~ {}: {}", change.new_name, change.column_type));
                }
            }
            for drop in &alter.drop_column_list {
                lines.push(format!("  - {}", drop.name));
            }
        }
        for drop in &self.drop_table_list {
            lines.push(format!("- table {}", qualified(&drop.schema, &drop.name)));
        }

        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn make_schema(tables: Vec<Table>) -> Schema {
        Schema {
            id: "s1".to_string(),
            name: String::new(),
            tables,
        }
    }

    fn make_table(id: &str, name: &str, columns: Vec<Column>) -> Table {
        Table {
            columns,
            ..Table::new(id, name)
        }
    }

    fn users_table() -> Table {
        make_table(
            "t1",
            "users",
            vec![
                Column::new("c1", "id", "int"),
                Column::new("c2", "email", "varchar(255)"),
                Column::new("c3", "bio", "text").with_nullable(true),
            ],
        )
    }

    #[test]
    fn test_diff_identical_schemas() {
        let schema = make_schema(vec![users_table()]);
        let diff = diff_schema("shop", &schema, &schema);
        assert!(!diff.has_changes());
        assert_eq!(diff, SchemaDiffResult::default());
    }

    #[test]
    fn test_diff_empty_schemas() {
        let schema = make_schema(vec![]);
        assert!(!diff_schema("shop", &schema, &schema).has_changes());
    }

    #[test]
    fn test_diff_create_table() {
        let origin = make_schema(vec![]);
        let edited = make_schema(vec![
            users_table()
                .with_engine("InnoDB")
                .with_collation("utf8mb4_bin")
                .with_comment("people"),
        ]);

        let diff = diff_schema("shop", &origin, &edited);
        assert_eq!(diff.create_table_list.len(), 1);
        assert!(diff.alter_table_list.is_empty());
        assert!(diff.rename_table_list.is_empty());
        assert!(diff.drop_table_list.is_empty());

        let create = &diff.create_table_list[0];
        assert_eq!(create.name, "users");
        assert_eq!(create.engine, "InnoDB");
        assert_eq!(create.collation, "utf8mb4_bin");
        assert_eq!(create.comment, "people");
        assert!(create.add_column_list.is_empty());
        assert!(create.primary_key_list.is_empty());
        assert!(create.add_foreign_key_list.is_empty());
    }

    #[test]
    fn test_diff_drop_table() {
        let origin = make_schema(vec![users_table()]);
        let edited = make_schema(vec![]);

        let diff = diff_schema("shop", &origin, &edited);
        assert_eq!(
            diff.drop_table_list,
            vec![DropTableContext {
                schema: String::new(),
                name: "users".to_string(),
            }]
        );
        assert_eq!(diff.change_count(), 1);
    }

    #[test]
    fn test_diff_nullability_only() {
        let origin = make_schema(vec![users_table()]);
        let mut edited = origin.clone();
        edited.tables[0].columns[1].nullable = Some(true);

        let diff = diff_schema("shop", &origin, &edited);
        assert!(diff.create_table_list.is_empty());
        assert!(diff.rename_table_list.is_empty());
        assert!(diff.drop_table_list.is_empty());
        assert_eq!(diff.alter_table_list.len(), 1);

        let alter = &diff.alter_table_list[0];
        assert!(alter.add_column_list.is_empty());
        assert!(alter.drop_column_list.is_empty());
        assert_eq!(alter.change_column_list.len(), 1);

        let change = &alter.change_column_list[0];
        assert_eq!(change.old_name, "email");
        assert_eq!(change.new_name, "email");
        assert!(change.nullable);
    }

    #[test]
    fn test_diff_add_and_drop_column() {
        let origin = make_schema(vec![users_table()]);
        let mut edited = origin.clone();
        edited.tables[0].columns.remove(2);
        edited.tables[0]
            .columns
            .push(Column::new("c4", "age", "int").with_default("0"));

        let diff = diff_schema("shop", &origin, &edited);
        let alter = &diff.alter_table_list[0];
        assert_eq!(alter.add_column_list.len(), 1);
        assert_eq!(alter.add_column_list[0].name, "age");
        assert_eq!(alter.add_column_list[0].default.as_deref(), Some("0"));
        assert_eq!(
            alter.drop_column_list,
            vec![DropColumnContext {
                name: "bio".to_string()
            }]
        );
        assert!(alter.change_column_list.is_empty());
    }

    #[test]
    fn test_diff_column_default_removed() {
        let origin = make_schema(vec![make_table(
            "t1",
            "users",
            vec![Column::new("c1", "status", "varchar(16)").with_default("'active'")],
        )]);
        let mut edited = origin.clone();
        edited.tables[0].columns[0].default = None;

        let diff = diff_schema("shop", &origin, &edited);
        let change = &diff.alter_table_list[0].change_column_list[0];
        assert_eq!(change.default, None);
    }

    #[test]
    fn test_diff_comment_change_via_classification() {
        let origin = make_schema(vec![make_table(
            "t1",
            "users",
            vec![Column::new("c1", "email", "text").with_user_comment("login")],
        )]);
        let mut edited = origin.clone();
        edited.tables[0].columns[0].classification = Some("1-1".to_string());

        let diff = diff_schema("shop", &origin, &edited);
        let change = &diff.alter_table_list[0].change_column_list[0];
        assert_eq!(change.comment, "1-1-login");
    }

    #[test]
    fn test_diff_comment_parts_with_same_composite_are_unchanged() {
        let origin = make_schema(vec![make_table(
            "t1",
            "users",
            vec![Column::new("c1", "email", "text").with_user_comment("login")],
        )]);
        let mut edited = origin.clone();
        edited.tables[0].columns[0].classification = Some(String::new());

        assert!(!diff_schema("shop", &origin, &edited).has_changes());
    }

    #[test]
    fn test_diff_column_rename_keeps_identity() {
        let origin = make_schema(vec![users_table()]);
        let mut edited = origin.clone();
        edited.tables[0].columns[1].name = Some("email_address".to_string());

        let diff = diff_schema("shop", &origin, &edited);
        let alter = &diff.alter_table_list[0];
        assert!(alter.add_column_list.is_empty());
        assert!(alter.drop_column_list.is_empty());

        let change = &alter.change_column_list[0];
        assert_eq!(change.old_name, "email");
        assert_eq!(change.new_name, "email_address");
    }

    #[test]
    fn test_diff_detects_table_rename() {
        let origin = make_schema(vec![users_table()]);
        let mut edited = origin.clone();
        edited.tables[0].name = Some("user".to_string());

        let diff = diff_schema("shop", &origin, &edited);
        assert_eq!(
            diff.rename_table_list,
            vec![RenameTableContext {
                schema: String::new(),
                old_name: "users".to_string(),
                new_name: "user".to_string(),
            }]
        );
        // A pure rename carries no column changes.
        assert!(diff.alter_table_list.is_empty());
        assert!(diff.create_table_list.is_empty());
        assert!(diff.drop_table_list.is_empty());
    }

    #[test]
    fn test_diff_uses_schema_name() {
        let origin = Schema::new("s1", "public");
        let edited = Schema::new("s1", "public").with_table(users_table());

        let diff = diff_schema("shop", &origin, &edited);
        assert_eq!(diff.create_table_list[0].schema, "public");
    }

    #[test]
    fn test_diff_does_not_compare_schema_ids() {
        let origin = make_schema(vec![users_table()]);
        let edited = Schema {
            id: "s2".to_string(),
            ..origin.clone()
        };

        assert!(!diff_schema("shop", &origin, &edited).has_changes());
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let a = SchemaDiffResult {
            drop_table_list: vec![DropTableContext {
                schema: "a".to_string(),
                name: "one".to_string(),
            }],
            ..Default::default()
        };
        let b = SchemaDiffResult {
            drop_table_list: vec![DropTableContext {
                schema: "b".to_string(),
                name: "two".to_string(),
            }],
            create_table_list: vec![CreateTableContext {
                name: "three".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let merged = merge_diff_results([a, b]);
        let dropped: Vec<_> = merged
            .drop_table_list
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(dropped, ["one", "two"]);
        assert_eq!(merged.create_table_list.len(), 1);
    }

    #[test]
    fn test_merge_nothing() {
        assert_eq!(merge_diff_results([]), SchemaDiffResult::default());
    }

    #[test]
    fn snapshot_diff_display() {
        let origin = make_schema(vec![
            users_table(),
            make_table("t2", "legacy_sessions", vec![Column::new("c1", "id", "int")]),
        ]);
        let mut edited = make_schema(vec![
            users_table(),
            make_table("t3", "orders", vec![Column::new("c1", "id", "int")]),
        ]);
        let users = &mut edited.tables[0];
        users.name = Some("user".to_string());
        users.columns[0].column_type = Some("bigint".to_string());
        users.columns[1].name = Some("mail".to_string());
        users.columns.remove(2);
        users
            .columns
            .push(Column::new("c4", "nickname", "varchar(32)").with_nullable(true));

        let diff = diff_schema("shop", &origin, &edited);
        insta::assert_snapshot!(diff.to_string(), @r"
        + table orders
        ~ rename users -> user
        user:
          + nickname: varchar(32) (nullable)
          ~ id: bigint
          ~ email -> mail: varchar(255)
          - bio
        - table legacy_sessions
        ");
    }

    #[test]
    fn snapshot_no_changes() {
        let schema = make_schema(vec![users_table()]);
        let diff = diff_schema("shop", &schema, &schema);
        insta::assert_snapshot!(diff.to_string(), @"No changes detected.");
    }
}
