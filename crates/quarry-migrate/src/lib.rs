//! Schema migrations for quarry-sql.
//!
//! `quarry-migrate` compares the tables an application declares with the
//! tables a database actually has and produces the DDL closing the gap:
//! - Missing tables are created with their indexes
//! - Missing columns are added, changed columns are altered
//! - Deprecated columns are renamed or dropped
//! - Changed indexes are recreated and obsolete ones dropped
//!
//! Columns present only in the database are never dropped implicitly; a
//! column goes away once the application marks it deprecated.
//!
//! # Architecture
//!
//! - **Differ** - [`diff`] turns one desired/observed table pair into statements
//! - **Planner** - [`migrate`] diffs every table registered on a database
//! - **Introspection** - [`Introspect`] supplies observed tables
//! - **Schema files** - [`SchemaFile`] loads declarations and snapshots from JSON
//!
//! # Example
//!
//! ```rust
//! use quarry_migrate::diff;
//! use quarry_sql_core::schema::{Column, ColumnType, FieldKind, Table};
//! use quarry_sql_postgres::PostgresDialect;
//!
//! let mut observed = Table::new("t_user");
//! observed.add_col(Column::new("f_id", ColumnType::new(FieldKind::Int64)));
//!
//! let mut desired = observed.clone();
//! desired.add_col(Column::new("f_name", ColumnType::new(FieldKind::String).null()));
//!
//! let statements = diff(&desired, Some(&observed), &PostgresDialect::new());
//! let (sql, _) = statements[0].build().unwrap();
//! assert_eq!(sql, "ALTER TABLE t_user ADD COLUMN f_name character varying(255);");
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the script migrating the observed snapshot to the declared schema
//! quarry-migrate diff --desired schema.json --observed snapshot.json
//!
//! # Print CREATE statements for every declared table
//! quarry-migrate create --desired schema.json
//!
//! # Apply the script to a database
//! quarry-migrate apply --desired schema.json --observed snapshot.json --database-url postgres://...
//! ```

pub mod diff;
pub mod error;
pub mod introspect;
pub mod plan;
pub mod schema_file;

pub use diff::diff;
pub use error::{MigrateError, Result};
pub use introspect::Introspect;
pub use plan::{migrate, MigrationPlan, TablePlan};
pub use schema_file::SchemaFile;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::diff::diff;
    pub use crate::error::{MigrateError, Result};
    pub use crate::introspect::{Empty, Introspect};
    pub use crate::plan::{migrate, MigrationPlan, TablePlan};
    pub use crate::schema_file::{ColumnSpec, KeySpec, SchemaFile, TableSpec};
}
