//! Diffs a desired table against its observed state.
//!
//! The result is the ordered DDL that turns a database matching the
//! observed table into one matching the desired table. Columns that only
//! exist in the observed table are left alone; dropping a column requires
//! marking it deprecated in the desired table.

use std::collections::BTreeMap;

use quarry_sql_core::builder::{Ex, SqlExpr, Toggles};
use quarry_sql_core::dialect::Dialect;
use quarry_sql_core::schema::{Column, Key, Table};
use tracing::debug;

fn render(e: &Ex) -> String {
    e.ex(&Toggles::default()).query().to_string()
}

fn push(out: &mut Vec<Ex>, e: Ex) {
    if !e.is_nil() {
        out.push(e);
    }
}

/// Computes the statements migrating `observed` into `desired`.
///
/// With no observed table the desired table is created from scratch.
///
/// # Panics
///
/// Panics when a deprecated column is renamed to a column `desired` does
/// not declare.
#[must_use]
pub fn diff(desired: &Table, observed: Option<&Table>, dialect: &dyn Dialect) -> Vec<Ex> {
    let Some(observed) = observed else {
        debug!(table = %desired.name, "table not found, creating");
        return dialect.create_table_if_not_exists(desired);
    };

    let mut out = Vec::new();
    let mut prev = observed.clone();

    let (deprecated, live): (Vec<&Column>, Vec<&Column>) =
        desired.columns.iter().partition(|c| c.is_deprecated());

    for column in deprecated {
        let rename_to = column
            .column_type
            .deprecated
            .as_ref()
            .and_then(|acts| acts.rename_to.as_deref());

        let Some(prev_col) = prev.col(&column.name).cloned() else {
            continue;
        };

        match rename_to {
            Some(target) => {
                let target_col = desired.col(target).unwrap_or_else(|| {
                    panic!(
                        "`{}` cannot be renamed: column `{target}` is not declared on table `{}`",
                        column.name, desired.name
                    )
                });
                if let Some(stale) = prev.columns.remove(target) {
                    debug!(
                        table = %desired.name,
                        column = %stale.name,
                        "dropping stale rename target"
                    );
                    push(&mut out, dialect.drop_column(&prev, &stale));
                }
                debug!(
                    table = %desired.name,
                    from = %prev_col.name,
                    to = %target,
                    "renaming column"
                );
                push(&mut out, dialect.rename_column(&prev, &prev_col, target_col));

                // The renamed column keeps its observed type, so a type change
                // on the target still shows up below.
                prev.columns.remove(&prev_col.name);
                let mut renamed = prev_col;
                renamed.name = target_col.name.clone();
                renamed.field_name = target_col.field_name.clone();
                prev.add_col(renamed);
            }
            None => {
                debug!(
                    table = %desired.name,
                    column = %prev_col.name,
                    "dropping deprecated column"
                );
                push(&mut out, dialect.drop_column(&prev, &prev_col));
                prev.columns.remove(&prev_col.name);
            }
        }
    }

    for column in live {
        match prev.col(&column.name) {
            None => {
                debug!(table = %desired.name, column = %column.name, "adding column");
                push(&mut out, dialect.add_column(desired, column));
            }
            Some(prev_col) => {
                let want = render(&dialect.data_type(&column.column_type));
                let have = render(&dialect.data_type(&prev_col.column_type));
                if want != have {
                    debug!(
                        table = %desired.name,
                        column = %column.name,
                        %want,
                        %have,
                        "modifying column"
                    );
                    push(&mut out, dialect.modify_column(desired, column, prev_col));
                }
            }
        }
    }

    diff_keys(desired, observed, dialect, &mut out);
    out
}

fn diff_keys(desired: &Table, observed: &Table, dialect: &dyn Dialect, out: &mut Vec<Ex>) {
    let key_name = |key: &Key| {
        if key.is_primary() {
            dialect.primary_key_name().to_string()
        } else {
            key.name.clone()
        }
    };

    let mut remaining: BTreeMap<String, &Key> =
        observed.keys.iter().map(|k| (key_name(k), k)).collect();

    for key in &desired.keys {
        match remaining.remove(&key_name(key)) {
            None => {
                debug!(table = %desired.name, key = %key.name, "adding index");
                push(out, dialect.add_index(desired, key));
            }
            Some(prev_key) => {
                let want = render(&dialect.add_index(desired, key));
                let have = render(&dialect.add_index(observed, prev_key));
                if !want.eq_ignore_ascii_case(&have) {
                    debug!(table = %desired.name, key = %key.name, "recreating index");
                    push(out, dialect.drop_index(observed, prev_key));
                    push(out, dialect.add_index(desired, key));
                }
            }
        }
    }

    for key in remaining.values() {
        debug!(table = %desired.name, key = %key.name, "dropping index");
        push(out, dialect.drop_index(observed, key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_sql_core::schema::{ColumnType, FieldKind};
    use quarry_sql_postgres::PostgresDialect;

    fn sql(statements: &[Ex]) -> Vec<String> {
        statements.iter().map(render).collect()
    }

    fn base() -> Table {
        let mut t = Table::new("t_item");
        t.add_col(
            Column::new("f_id", ColumnType::new(FieldKind::Int64).autoincrement()).field("ID"),
        );
        t.add_col(Column::new("f_name", ColumnType::new(FieldKind::String)).field("Name"));
        t.add_key(Key::primary(["ID"]));
        t
    }

    #[test]
    fn test_missing_table_is_created() {
        let statements = diff(&base(), None, &PostgresDialect::new());
        assert_eq!(statements.len(), 1);
        assert!(render(&statements[0]).starts_with("CREATE TABLE IF NOT EXISTS t_item"));
    }

    #[test]
    fn test_observed_only_columns_are_kept() {
        let desired = base();
        let mut observed = base();
        observed.add_col(Column::new("f_legacy", ColumnType::new(FieldKind::Int32).null()));
        assert!(diff(&desired, Some(&observed), &PostgresDialect::new()).is_empty());
    }

    #[test]
    fn test_deprecated_without_target_drops() {
        let mut desired = base();
        desired.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32).deprecated()));
        let mut observed = base();
        observed.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32)));
        let d = PostgresDialect::new();
        assert_eq!(
            sql(&diff(&desired, Some(&observed), &d)),
            ["ALTER TABLE t_item DROP COLUMN f_old;"]
        );
        // Already gone.
        assert!(diff(&desired, Some(&base()), &d).is_empty());
    }

    #[test]
    fn test_rename_drops_stale_target() {
        let mut desired = base();
        desired.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32).rename_to("f_new")));
        desired.add_col(Column::new("f_new", ColumnType::new(FieldKind::Int32)));
        let mut observed = base();
        observed.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32)));
        observed.add_col(Column::new("f_new", ColumnType::new(FieldKind::Int32).null()));
        assert_eq!(
            sql(&diff(&desired, Some(&observed), &PostgresDialect::new())),
            [
                "ALTER TABLE t_item DROP COLUMN f_new;",
                "ALTER TABLE t_item RENAME COLUMN f_old TO f_new;",
            ]
        );
    }

    #[test]
    fn test_rename_then_retype() {
        let mut desired = base();
        desired.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32).rename_to("f_new")));
        desired.add_col(Column::new("f_new", ColumnType::new(FieldKind::Int64)));
        let mut observed = base();
        observed.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32)));
        assert_eq!(
            sql(&diff(&desired, Some(&observed), &PostgresDialect::new())),
            [
                "ALTER TABLE t_item RENAME COLUMN f_old TO f_new;",
                "ALTER TABLE t_item ALTER COLUMN f_new TYPE bigint /* FROM integer */;",
            ]
        );
    }

    #[test]
    #[should_panic(expected = "is not declared")]
    fn test_rename_to_undeclared_panics() {
        let mut desired = base();
        desired.add_col(Column::new(
            "f_old",
            ColumnType::new(FieldKind::Int32).rename_to("f_missing"),
        ));
        let mut observed = base();
        observed.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32)));
        let _ = diff(&desired, Some(&observed), &PostgresDialect::new());
    }

    #[test]
    fn test_changed_index_is_recreated() {
        let mut desired = base();
        desired.add_key(Key::index("i_name").fields(["Name"]).using("BTREE"));
        let mut observed = base();
        observed.add_key(Key::index("i_name").fields(["Name"]));
        assert_eq!(
            sql(&diff(&desired, Some(&observed), &PostgresDialect::new())),
            [
                "DROP INDEX IF EXISTS t_item_i_name;",
                "CREATE INDEX t_item_i_name ON t_item USING BTREE (f_name);",
            ]
        );
    }

    #[test]
    fn test_index_comparison_ignores_case() {
        let mut desired = base();
        desired.add_key(Key::index("i_name").fields(["Name"]).using("btree"));
        let mut observed = base();
        observed.add_key(Key::index("i_name").fields(["Name"]).using("BTREE"));
        assert!(diff(&desired, Some(&observed), &PostgresDialect::new()).is_empty());
    }

    #[test]
    fn test_introspected_primary_key_name_matches() {
        let desired = base();
        let mut observed = base();
        observed.keys.remove("primary");
        observed.add_key(Key::unique_index("t_item_pkey").fields(["ID"]));
        assert!(diff(&desired, Some(&observed), &PostgresDialect::new()).is_empty());
    }
}
