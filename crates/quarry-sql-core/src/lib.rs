//! # quarry-sql-core
//!
//! A context-sensitive SQL expression builder with a dialect-agnostic schema
//! model.
//!
//! This crate provides:
//! - An expression core where templates with `?` holders nest recursively and
//!   render according to inherited [`Toggles`](builder::Toggles)
//! - A boolean condition algebra with nil absorption
//! - SELECT/INSERT/UPDATE/DELETE builders with canonically ordered clauses
//! - A schema model (tables, columns, keys) built from [`Model`](schema::Model)
//!   descriptors and registered on a [`Database`](schema::Database)
//! - The [`Dialect`](dialect::Dialect) trait engines implement to produce DDL
//!
//! ## Rendering
//!
//! ```rust
//! use quarry_sql_core::builder::{SqlExpr, Toggles};
//! use quarry_sql_core::schema::col;
//!
//! let a = col("a");
//! let b = col("b");
//! let cond = a.eq(1).and(b.like("x")).or(a.eq(2));
//! let (sql, params) = cond.ex(&Toggles::default()).build().unwrap();
//!
//! assert_eq!(sql, "((a = ?) AND (b LIKE ?)) OR (a = ?)");
//! assert_eq!(params.len(), 3);
//! ```
//!
//! Values are never spliced into the query text; they are returned as
//! positional parameters for the driver to bind.

pub mod builder;
pub mod dialect;
pub mod error;
pub mod schema;

pub use builder::{Condition, Ex, SqlExpr, SqlValue, Toggle, Toggles};
pub use dialect::Dialect;
pub use error::{BuildError, DbErr, SchemaError, SqlError};
pub use schema::{col, Column, ColumnType, Database, FieldKind, Key, Model, Table};
