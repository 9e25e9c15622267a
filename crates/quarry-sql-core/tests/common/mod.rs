#![allow(dead_code)]

use quarry_sql_core::builder::{SqlExpr, SqlValue, Toggles};
use quarry_sql_core::schema::{Column, ColumnType, FieldKind, FieldMeta, Indexes, Model};

pub fn render(e: &dyn SqlExpr) -> (String, Vec<SqlValue>) {
    e.ex(&Toggles::default())
        .build()
        .unwrap_or_else(|err| panic!("Failed to build: {err}"))
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

pub struct User;

impl Model for User {
    fn table_name() -> &'static str {
        "t_user"
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
            Column::new("f_org_id", ColumnType::new(FieldKind::Uint64)).field("OrgID"),
            Column::new("f_name", ColumnType::new(FieldKind::String).size(64).default("''"))
                .field("Name"),
            Column::new("f_age", ColumnType::new(FieldKind::Int32).null()).field("Age"),
        ]
    }

    fn primary_key() -> Vec<&'static str> {
        vec!["ID"]
    }

    fn unique_indexes() -> Indexes {
        Indexes::from([("i_name", vec!["Name"])])
    }

    fn indexes() -> Indexes {
        Indexes::from([("i_org/btree", vec!["OrgID"])])
    }

    fn comments() -> FieldMeta<&'static str> {
        FieldMeta::from([("Name", "display name")])
    }
}

pub struct Org;

impl Model for Org {
    fn table_name() -> &'static str {
        "t_org"
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
            Column::new("f_name", ColumnType::new(FieldKind::String)).field("Name"),
        ]
    }

    fn primary_key() -> Vec<&'static str> {
        vec!["ID"]
    }
}
