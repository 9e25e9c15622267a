//! # quarry-sql-postgres
//!
//! PostgreSQL support for `quarry-sql-core`.
//!
//! # How PostgreSQL differs from other dialects
//!
//! - **[Placeholders]**: PostgreSQL numbers its parameters (`$1`, `$2`, ...)
//!   instead of accepting `?`. Built statements go through [`rebind`] before
//!   they reach the driver.
//! - **[Serial types]**: auto-increment columns are declared as `smallserial`,
//!   `serial` or `bigserial` rather than with an `AUTO_INCREMENT` attribute.
//! - **Constraint names**: the primary key constraint of `t` is named
//!   `t_pkey`, and index names are scoped per schema, so indexes are created
//!   as `<table>_<name>`.
//! - **[ALTER TABLE]**: type, nullability and default changes are separate
//!   `ALTER COLUMN` actions, combined into one statement.
//! - **[Error codes]**: failures carry a SQLSTATE. `23505` is a uniqueness
//!   conflict and `3D000` an unknown database.
//!
//! [Placeholders]: https://www.postgresql.org/docs/current/sql-prepare.html
//! [Serial types]: https://www.postgresql.org/docs/current/datatype-numeric.html#DATATYPE-SERIAL
//! [ALTER TABLE]: https://www.postgresql.org/docs/current/sql-altertable.html
//! [Error codes]: https://www.postgresql.org/docs/current/errcodes-appendix.html
//!
//! ## Example
//!
//! ```rust
//! use quarry_sql_core::dialect::Dialect;
//! use quarry_sql_core::schema::{Column, ColumnType, FieldKind, Key, Table};
//! use quarry_sql_postgres::PostgresDialect;
//!
//! let mut t = Table::new("t_user");
//! t.add_col(Column::new("f_id", ColumnType::new(FieldKind::Int64).autoincrement()).field("ID"));
//! t.add_key(Key::primary(["ID"]));
//!
//! let create = PostgresDialect::new().create_table_if_not_exists(&t);
//! let (sql, _) = create[0].build().unwrap();
//! assert_eq!(sql, "CREATE TABLE IF NOT EXISTS t_user (\n\tf_id bigserial NOT NULL,\n\tPRIMARY KEY (f_id)\n);");
//! ```

mod dialect;
pub mod exec;
mod rebind;

pub use dialect::{PostgresDialect, INVALID_CATALOG_NAME, UNIQUE_VIOLATION};
pub use exec::{connect, execute, execute_all, fetch_all, fetch_one, fetch_optional, prepare};
pub use rebind::rebind;
