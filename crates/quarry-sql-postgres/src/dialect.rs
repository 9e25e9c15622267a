//! PostgreSQL dialect implementation.

use std::error::Error as StdError;

use quarry_sql_core::builder::Ex;
use quarry_sql_core::dialect::Dialect;
use quarry_sql_core::schema::{Column, ColumnType, FieldKind, Key, Table};

/// SQLSTATE of `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE of `invalid_catalog_name`, raised when connecting to a database
/// that does not exist.
pub const INVALID_CATALOG_NAME: &str = "3D000";

/// `varchar` columns longer than this become `text`.
const VARCHAR_LIMIT: u64 = 65535 / 3;

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Native type of `column_type` without size or modifiers.
    #[must_use]
    pub fn native_type(column_type: &ColumnType) -> String {
        dealias(&db_data_type(column_type))
    }
}

fn db_data_type(ct: &ColumnType) -> String {
    if let Some(data_type) = &ct.data_type {
        return data_type.clone();
    }
    let native = match ct.kind {
        FieldKind::Bool => "boolean",
        FieldKind::Int8 | FieldKind::Int16 | FieldKind::Uint8 => {
            if ct.auto_increment {
                "smallserial"
            } else {
                "smallint"
            }
        }
        FieldKind::Int32 | FieldKind::Uint16 => {
            if ct.auto_increment {
                "serial"
            } else {
                "integer"
            }
        }
        FieldKind::Int64 | FieldKind::Uint32 | FieldKind::Uint64 => {
            if ct.auto_increment {
                "bigserial"
            } else {
                "bigint"
            }
        }
        FieldKind::Float32 => "real",
        FieldKind::Float64 => "double precision",
        FieldKind::String => {
            if ct.length < VARCHAR_LIMIT {
                "varchar"
            } else {
                "text"
            }
        }
        FieldKind::Bytes => "bytea",
        FieldKind::Time => "timestamp with time zone",
        FieldKind::Json => "jsonb",
    };
    native.to_string()
}

fn dealias(data_type: &str) -> String {
    match data_type {
        "varchar" => String::from("character varying"),
        "timestamp" => String::from("timestamp without time zone"),
        other => other.to_string(),
    }
}

fn size_modifier(length: u64, decimal: u64) -> String {
    if decimal > 0 {
        format!("({length},{decimal})")
    } else {
        format!("({length})")
    }
}

fn autocomplete_size(data_type: &str, ct: &ColumnType) -> String {
    match data_type {
        "character varying" | "character" => {
            let length = if ct.length == 0 { 255 } else { ct.length };
            size_modifier(length, ct.decimal)
        }
        "decimal" | "numeric" | "real" | "double precision" if ct.length > 0 => {
            size_modifier(ct.length, ct.decimal)
        }
        _ => String::new(),
    }
}

/// Casts literal defaults to the column type: `'x'` becomes `'x'::type` and
/// a bare number becomes `'0'::type`. Anything else (function calls,
/// keywords) is kept as written.
fn normalize_default(default: &str, data_type: &str) -> String {
    if default.starts_with('\'') {
        if default.contains("'::") {
            return default.to_string();
        }
        return format!("{default}::{data_type}");
    }
    if default.parse::<f64>().is_ok() {
        return format!("'{default}'::{data_type}");
    }
    default.to_string()
}

fn modifiers(ct: &ColumnType, data_type: &str) -> String {
    let mut out = String::new();
    if !ct.null {
        out.push_str(" NOT NULL");
    }
    if let Some(default) = &ct.default {
        out.push_str(" DEFAULT ");
        out.push_str(&normalize_default(default, data_type));
    }
    out
}

fn index_method(method: &str) -> String {
    let method = method.to_uppercase();
    if method == "SPATIAL" {
        String::from("GIST")
    } else {
        method
    }
}

fn index_name(table: &Table, key: &Key) -> String {
    format!("{}_{}", table.name, key.name)
}

fn sqlstate(err: &(dyn StdError + 'static)) -> Option<String> {
    match err.downcast_ref::<sqlx::Error>()? {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

fn alter_table(table: &Table) -> Ex {
    let mut e = Ex::new("ALTER TABLE ", Vec::new());
    e.write_expr(table);
    e
}

impl Dialect for PostgresDialect {
    fn driver_name(&self) -> &'static str {
        "postgres"
    }

    fn primary_key_name(&self) -> &'static str {
        "pkey"
    }

    fn create_table_if_not_exists(&self, table: &Table) -> Vec<Ex> {
        let mut e = Ex::new("CREATE TABLE IF NOT EXISTS ", Vec::new());
        e.write_expr(table);
        e.write_query(" (");

        let mut first = true;
        for column in table.columns.iter().filter(|c| !c.is_deprecated()) {
            if !first {
                e.write_query_byte(',');
            }
            first = false;
            e.write_query("\n\t");
            e.write_expr(column);
            e.write_query_byte(' ');
            e.write_expr(self.data_type(&column.column_type));
        }

        if let Some(primary) = table.keys.primary() {
            e.write_query(",\n\tPRIMARY KEY ");
            e.write_group(|e| e.write_expr(primary.def.table_expr(table)));
        }
        e.write_query("\n);");

        let mut statements = vec![e];
        statements.extend(
            table
                .keys
                .iter()
                .filter(|k| !k.is_primary())
                .map(|k| self.add_index(table, k)),
        );
        statements
    }

    fn drop_table(&self, table: &Table) -> Ex {
        let mut e = Ex::new("DROP TABLE IF EXISTS ", Vec::new());
        e.write_expr(table);
        e.write_end();
        e
    }

    fn truncate_table(&self, table: &Table) -> Ex {
        let mut e = Ex::new("TRUNCATE TABLE ", Vec::new());
        e.write_expr(table);
        e.write_end();
        e
    }

    fn add_column(&self, table: &Table, column: &Column) -> Ex {
        let mut e = alter_table(table);
        e.write_query(" ADD COLUMN ");
        e.write_expr(column);
        e.write_query_byte(' ');
        e.write_expr(self.data_type(&column.column_type));
        e.write_end();
        e
    }

    fn rename_column(&self, table: &Table, from: &Column, to: &Column) -> Ex {
        let mut e = alter_table(table);
        e.write_query(" RENAME COLUMN ");
        e.write_expr(from);
        e.write_query(" TO ");
        e.write_expr(to);
        e.write_end();
        e
    }

    fn modify_column(&self, table: &Table, column: &Column, prev: &Column) -> Ex {
        let ct = &column.column_type;
        let prev_ct = &prev.column_type;
        if ct.auto_increment {
            return Ex::default();
        }

        let data_type = Self::native_type(ct);
        let prev_data_type = Self::native_type(prev_ct);
        let size = autocomplete_size(&data_type, ct);
        let prev_size = autocomplete_size(&prev_data_type, prev_ct);

        let mut changes: Vec<Ex> = Vec::new();
        let alter_column = || {
            let mut e = Ex::new("ALTER COLUMN ", Vec::new());
            e.write_expr(column);
            e
        };

        if data_type != prev_data_type || size != prev_size {
            let mut e = alter_column();
            e.write_query(" TYPE ");
            e.write_literal(&format!(
                "{data_type}{size} /* FROM {prev_data_type}{prev_size} */"
            ));
            changes.push(e);
        }

        if ct.null != prev_ct.null {
            let mut e = alter_column();
            e.write_query(if ct.null {
                " DROP NOT NULL"
            } else {
                " SET NOT NULL"
            });
            changes.push(e);
        }

        let default = ct
            .default
            .as_deref()
            .map(|d| normalize_default(d, &data_type));
        let prev_default = prev_ct
            .default
            .as_deref()
            .map(|d| normalize_default(d, &prev_data_type));
        if default != prev_default {
            let mut e = alter_column();
            match default {
                Some(default) => {
                    e.write_query(" SET DEFAULT ");
                    e.write_literal(&match prev_default {
                        Some(prev_default) => format!("{default} /* FROM {prev_default} */"),
                        None => default,
                    });
                }
                None => e.write_query(" DROP DEFAULT"),
            }
            changes.push(e);
        }

        if changes.is_empty() {
            return Ex::default();
        }

        let mut e = alter_table(table);
        e.write_query_byte(' ');
        for (i, change) in changes.into_iter().enumerate() {
            if i > 0 {
                e.write_query(", ");
            }
            e.write_expr(change);
        }
        e.write_end();
        e
    }

    fn drop_column(&self, table: &Table, column: &Column) -> Ex {
        let mut e = alter_table(table);
        e.write_query(" DROP COLUMN ");
        e.write_expr(column);
        e.write_end();
        e
    }

    fn add_index(&self, table: &Table, key: &Key) -> Ex {
        if key.is_primary() {
            let mut e = alter_table(table);
            e.write_query(" ADD PRIMARY KEY ");
            e.write_group(|e| e.write_expr(key.def.table_expr(table)));
            e.write_end();
            return e;
        }

        let mut e = Ex::new(
            if key.is_unique {
                "CREATE UNIQUE INDEX "
            } else {
                "CREATE INDEX "
            },
            Vec::new(),
        );
        e.write_literal(&index_name(table, key));
        e.write_query(" ON ");
        e.write_expr(table);
        if !key.method.is_empty() {
            e.write_query(" USING ");
            e.write_literal(&index_method(&key.method));
        }
        e.write_query_byte(' ');
        e.write_group(|e| e.write_expr(key.def.table_expr(table)));
        e.write_end();
        e
    }

    fn drop_index(&self, table: &Table, key: &Key) -> Ex {
        if key.is_primary() {
            let mut e = alter_table(table);
            e.write_query(" DROP CONSTRAINT ");
            e.write_literal(&format!("{}_{}", table.name, self.primary_key_name()));
            e.write_end();
            return e;
        }

        let mut e = Ex::new("DROP INDEX IF EXISTS ", Vec::new());
        let name = index_name(table, key);
        if table.schema.is_empty() {
            e.write_literal(&name);
        } else {
            e.write_literal(&format!("{}.{name}", table.schema));
        }
        e.write_end();
        e
    }

    fn data_type(&self, column_type: &ColumnType) -> Ex {
        let data_type = Self::native_type(column_type);
        Ex::exactly(format!(
            "{data_type}{}{}",
            autocomplete_size(&data_type, column_type),
            modifiers(column_type, &data_type)
        ))
    }

    fn is_error_conflict(&self, err: &(dyn StdError + 'static)) -> bool {
        sqlstate(err).is_some_and(|code| code == UNIQUE_VIOLATION)
    }

    fn is_error_unknown_database(&self, err: &(dyn StdError + 'static)) -> bool {
        sqlstate(err).is_some_and(|code| code == INVALID_CATALOG_NAME)
    }

    fn is_error_not_found(&self, err: &(dyn StdError + 'static)) -> bool {
        matches!(err.downcast_ref::<sqlx::Error>(), Some(sqlx::Error::RowNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_sql_core::builder::{SqlExpr, Toggles};
    use quarry_sql_core::SqlError;

    fn sql(e: &Ex) -> String {
        e.ex(&Toggles::default()).query().to_string()
    }

    fn user() -> Table {
        let mut t = Table::new("t_user");
        t.add_col(
            Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
        );
        t.add_col(
            Column::new("f_name", ColumnType::new(FieldKind::String).default("''")).field("Name"),
        );
        t.add_col(
            Column::new("f_geo", ColumnType::new(FieldKind::Bytes).null().data_type("geometry"))
                .field("Geo"),
        );
        t.add_key(Key::primary(["ID"]));
        t.add_key(Key::unique_index("i_name").fields(["Name"]));
        t.add_key(Key::index("i_geo").using("spatial").fields(["Geo"]));
        t
    }

    #[test]
    fn test_data_types() {
        let d = PostgresDialect::new();
        let render = |ct: ColumnType| sql(&d.data_type(&ct));
        assert_eq!(render(ColumnType::new(FieldKind::Bool)), "boolean NOT NULL");
        assert_eq!(
            render(ColumnType::new(FieldKind::Int32).autoincrement()),
            "serial NOT NULL"
        );
        assert_eq!(
            render(ColumnType::new(FieldKind::Uint64).null()),
            "bigint"
        );
        assert_eq!(
            render(ColumnType::new(FieldKind::String)),
            "character varying(255) NOT NULL"
        );
        assert_eq!(
            render(ColumnType::new(FieldKind::String).size(30000)),
            "text NOT NULL"
        );
        assert_eq!(
            render(ColumnType::new(FieldKind::Float64).size(10).decimal(2)),
            "double precision(10,2) NOT NULL"
        );
        assert_eq!(
            render(ColumnType::new(FieldKind::Time).data_type("timestamp")),
            "timestamp without time zone NOT NULL"
        );
    }

    #[test]
    fn test_default_casting() {
        assert_eq!(normalize_default("''", "character varying"), "''::character varying");
        assert_eq!(normalize_default("'a'::text", "character varying"), "'a'::text");
        assert_eq!(normalize_default("0", "bigint"), "'0'::bigint");
        assert_eq!(normalize_default("CURRENT_TIMESTAMP", "timestamp"), "CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_create_table() {
        let d = PostgresDialect::new();
        let statements: Vec<String> = d
            .create_table_if_not_exists(&user())
            .iter()
            .map(sql)
            .collect();
        assert_eq!(
            statements,
            [
                "CREATE TABLE IF NOT EXISTS t_user (\n\
                 \tf_id bigserial NOT NULL,\n\
                 \tf_name character varying(255) NOT NULL DEFAULT ''::character varying,\n\
                 \tf_geo geometry,\n\
                 \tPRIMARY KEY (f_id)\n\
                 );",
                "CREATE UNIQUE INDEX t_user_i_name ON t_user (f_name);",
                "CREATE INDEX t_user_i_geo ON t_user USING GIST (f_geo);",
            ]
        );
    }

    #[test]
    fn test_create_table_skips_deprecated() {
        let mut t = user();
        t.add_col(
            Column::new("f_old", ColumnType::new(FieldKind::Int32).deprecated()).field("Old"),
        );
        let create = sql(&PostgresDialect::new().create_table_if_not_exists(&t)[0]);
        assert!(!create.contains("f_old"));
    }

    #[test]
    fn test_column_statements() {
        let d = PostgresDialect::new();
        let t = user().with_schema("app");
        let name = t.must_f("Name");
        assert_eq!(
            sql(&d.add_column(&t, name)),
            "ALTER TABLE app.t_user ADD COLUMN f_name character varying(255) NOT NULL DEFAULT ''::character varying;"
        );
        let renamed = Column::new("f_nick", name.column_type.clone());
        assert_eq!(
            sql(&d.rename_column(&t, name, &renamed)),
            "ALTER TABLE app.t_user RENAME COLUMN f_name TO f_nick;"
        );
        assert_eq!(
            sql(&d.drop_column(&t, name)),
            "ALTER TABLE app.t_user DROP COLUMN f_name;"
        );
        assert_eq!(sql(&d.drop_table(&t)), "DROP TABLE IF EXISTS app.t_user;");
        assert_eq!(sql(&d.truncate_table(&t)), "TRUNCATE TABLE app.t_user;");
    }

    #[test]
    fn test_modify_column() {
        let d = PostgresDialect::new();
        let t = user();
        let prev = Column::new("f_name", ColumnType::new(FieldKind::String).size(64).null());
        let next = Column::new(
            "f_name",
            ColumnType::new(FieldKind::String).size(128).default("'x'"),
        );
        assert_eq!(
            sql(&d.modify_column(&t, &next, &prev)),
            "ALTER TABLE t_user \
             ALTER COLUMN f_name TYPE character varying(128) /* FROM character varying(64) */, \
             ALTER COLUMN f_name SET NOT NULL, \
             ALTER COLUMN f_name SET DEFAULT 'x'::character varying;"
        );
        assert_eq!(
            sql(&d.modify_column(&t, &prev, &next)),
            "ALTER TABLE t_user \
             ALTER COLUMN f_name TYPE character varying(64) /* FROM character varying(128) */, \
             ALTER COLUMN f_name DROP NOT NULL, \
             ALTER COLUMN f_name DROP DEFAULT;"
        );
    }

    #[test]
    fn test_modify_column_nil_cases() {
        let d = PostgresDialect::new();
        let t = user();
        let id = t.must_f("ID");
        assert!(d.modify_column(&t, id, id).is_nil());
        let name = t.must_f("Name");
        assert!(d.modify_column(&t, name, name).is_nil());
    }

    #[test]
    fn test_index_statements() {
        let d = PostgresDialect::new();
        let t = user();
        let primary = t.keys.primary().unwrap();
        assert_eq!(sql(&d.add_index(&t, primary)), "ALTER TABLE t_user ADD PRIMARY KEY (f_id);");
        assert_eq!(
            sql(&d.drop_index(&t, primary)),
            "ALTER TABLE t_user DROP CONSTRAINT t_user_pkey;"
        );
        let name = t.key("i_name").unwrap().clone();
        assert_eq!(sql(&d.drop_index(&t, &name)), "DROP INDEX IF EXISTS t_user_i_name;");
        let t = t.with_schema("app");
        assert_eq!(
            sql(&d.drop_index(&t, &name)),
            "DROP INDEX IF EXISTS app.t_user_i_name;"
        );
    }

    #[test]
    fn test_error_classification() {
        let d = PostgresDialect::new();
        let not_found = sqlx::Error::RowNotFound;
        assert!(d.is_error_not_found(&not_found));
        assert!(!d.is_error_conflict(&not_found));
        let io = sqlx::Error::Protocol(String::from("bad message"));
        assert!(!d.is_error_not_found(&io));
        assert!(!d.is_error_unknown_database(&io));
    }

    #[derive(Debug)]
    struct ServerError(&'static str);

    impl std::fmt::Display for ServerError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "server error {}", self.0)
        }
    }

    impl StdError for ServerError {}

    impl sqlx::error::DatabaseError for ServerError {
        fn message(&self) -> &str {
            "server error"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(std::borrow::Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.0 == UNIQUE_VIOLATION {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }
    }

    fn server_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ServerError(code)))
    }

    #[test]
    fn test_sqlstate_classification() {
        let d = PostgresDialect::new();

        let duplicate = server_error(UNIQUE_VIOLATION);
        assert!(d.is_error_conflict(&duplicate));
        assert!(!d.is_error_unknown_database(&duplicate));
        assert!(!d.is_error_not_found(&duplicate));
        assert!(SqlError::classify(&d, duplicate).is_conflict());

        let missing_db = server_error(INVALID_CATALOG_NAME);
        assert!(d.is_error_unknown_database(&missing_db));
        assert!(!d.is_error_conflict(&missing_db));
        assert!(SqlError::classify(&d, missing_db).is_unknown_database());

        let other = server_error("42P01");
        assert!(!d.is_error_conflict(&other));
        assert!(!d.is_error_unknown_database(&other));
        let classified = SqlError::classify(&d, other);
        assert!(!classified.is_conflict());
        assert!(!classified.is_unknown_database());
        assert!(!classified.is_not_found());
    }
}
