//! Dialect abstraction.
//!
//! A dialect translates the abstract schema model into one engine's DDL and
//! classifies that engine's errors. The core never depends on a concrete
//! dialect; engines live in their own crates.

use std::error::Error as StdError;

use crate::builder::Ex;
use crate::schema::{Column, ColumnType, Key, Table};

/// Engine-specific DDL generation and error classification.
///
/// DDL methods return statements ending with `;`. A nil [`Ex`] means the
/// engine needs no statement for the change.
pub trait Dialect: Send + Sync {
    /// Driver name, e.g. `postgres`.
    fn driver_name(&self) -> &'static str;

    /// Name suffix the engine gives primary key constraints.
    fn primary_key_name(&self) -> &'static str;

    /// `CREATE TABLE IF NOT EXISTS` followed by the table's secondary
    /// indexes.
    fn create_table_if_not_exists(&self, table: &Table) -> Vec<Ex>;

    fn drop_table(&self, table: &Table) -> Ex;

    fn truncate_table(&self, table: &Table) -> Ex;

    fn add_column(&self, table: &Table, column: &Column) -> Ex;

    fn rename_column(&self, table: &Table, from: &Column, to: &Column) -> Ex;

    /// Alters `prev` into `column`. May be nil.
    fn modify_column(&self, table: &Table, column: &Column, prev: &Column) -> Ex;

    fn drop_column(&self, table: &Table, column: &Column) -> Ex;

    fn add_index(&self, table: &Table, key: &Key) -> Ex;

    fn drop_index(&self, table: &Table, key: &Key) -> Ex;

    /// Full native type of a column including size and modifiers, e.g.
    /// `character varying(255) NOT NULL DEFAULT ''::character varying`.
    fn data_type(&self, column_type: &ColumnType) -> Ex;

    /// Reports whether `err` is a uniqueness violation.
    fn is_error_conflict(&self, err: &(dyn StdError + 'static)) -> bool {
        let _ = err;
        false
    }

    /// Reports whether `err` means the target database does not exist.
    fn is_error_unknown_database(&self, err: &(dyn StdError + 'static)) -> bool {
        let _ = err;
        false
    }

    /// Reports whether `err` means no row matched.
    fn is_error_not_found(&self, err: &(dyn StdError + 'static)) -> bool {
        let _ = err;
        false
    }
}
