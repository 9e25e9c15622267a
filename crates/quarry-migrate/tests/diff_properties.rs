//! Properties of the differ against the PostgreSQL dialect.

use quarry_migrate::diff;
use quarry_sql_core::builder::{Ex, SqlExpr, Toggles};
use quarry_sql_core::schema::{Column, ColumnType, FieldKind, Key, Table};
use quarry_sql_postgres::PostgresDialect;

fn sql(statements: &[Ex]) -> Vec<String> {
    statements
        .iter()
        .map(|e| e.ex(&Toggles::default()).query().to_string())
        .collect()
}

fn users() -> Table {
    let mut t = Table::new("t_user").with_schema("app");
    t.add_col(
        Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement())
            .field("ID"),
    );
    t.add_col(
        Column::new("f_name", ColumnType::new(FieldKind::String).size(64).default("''"))
            .field("Name"),
    );
    t.add_col(
        Column::new("f_created_at", ColumnType::new(FieldKind::Time).default("CURRENT_TIMESTAMP"))
            .field("CreatedAt"),
    );
    t.add_col(
        Column::new("f_score", ColumnType::new(FieldKind::Float64).size(10).decimal(2).null())
            .field("Score"),
    );
    t.add_key(Key::primary(["ID"]));
    t.add_key(Key::unique_index("i_name").fields(["Name"]));
    t.add_key(Key::index("i_created").using("BTREE").fields(["CreatedAt"]));
    t
}

#[test]
fn diff_of_identical_tables_is_empty() {
    let t = users();
    assert!(diff(&t, Some(&t), &PostgresDialect::new()).is_empty());
}

#[test]
fn rename_yields_one_statement() {
    let mut desired = users();
    desired.add_col(
        Column::new("f_old", ColumnType::new(FieldKind::Int32).rename_to("f_new")).field("Old"),
    );
    desired.add_col(Column::new("f_new", ColumnType::new(FieldKind::Int32)).field("New"));

    let mut observed = users();
    observed.add_col(Column::new("f_old", ColumnType::new(FieldKind::Int32)).field("Old"));

    assert_eq!(
        sql(&diff(&desired, Some(&observed), &PostgresDialect::new())),
        ["ALTER TABLE app.t_user RENAME COLUMN f_old TO f_new;"]
    );
}

#[test]
fn removed_index_yields_one_drop() {
    let desired = users();
    let mut observed = users();
    observed.add_key(Key::index("i_score").fields(["Score"]));

    assert_eq!(
        sql(&diff(&desired, Some(&observed), &PostgresDialect::new())),
        ["DROP INDEX IF EXISTS app.t_user_i_score;"]
    );
}

#[test]
fn added_column_and_index() {
    let mut desired = users();
    desired.add_col(
        Column::new("f_email", ColumnType::new(FieldKind::String).null()).field("Email"),
    );
    desired.add_key(Key::unique_index("i_email").fields(["Email"]));

    assert_eq!(
        sql(&diff(&desired, Some(&users()), &PostgresDialect::new())),
        [
            "ALTER TABLE app.t_user ADD COLUMN f_email character varying(255);",
            "CREATE UNIQUE INDEX t_user_i_email ON app.t_user (f_email);",
        ]
    );
}

#[test]
fn modified_column() {
    let mut desired = users();
    desired.add_col(
        Column::new("f_score", ColumnType::new(FieldKind::Float64).size(10).decimal(2).default("0"))
            .field("Score"),
    );

    assert_eq!(
        sql(&diff(&desired, Some(&users()), &PostgresDialect::new())),
        ["ALTER TABLE app.t_user \
          ALTER COLUMN f_score SET NOT NULL, \
          ALTER COLUMN f_score SET DEFAULT '0'::double precision;"]
    );
}

#[test]
fn primary_key_change_is_recreated() {
    let mut desired = users();
    desired.keys.remove("primary");
    desired.add_key(Key::primary(["ID", "Name"]));

    assert_eq!(
        sql(&diff(&desired, Some(&users()), &PostgresDialect::new())),
        [
            "ALTER TABLE app.t_user DROP CONSTRAINT t_user_pkey;",
            "ALTER TABLE app.t_user ADD PRIMARY KEY (f_id, f_name);",
        ]
    );
}

#[test]
fn applying_a_plan_converges() {
    let mut desired = users();
    desired.add_col(
        Column::new("f_bio", ColumnType::new(FieldKind::String).size(30000)).field("Bio"),
    );

    let d = PostgresDialect::new();
    assert_eq!(diff(&desired, Some(&users()), &d).len(), 1);
    // Once the observed table matches, nothing is left to do.
    assert!(diff(&desired, Some(&desired), &d).is_empty());
}
