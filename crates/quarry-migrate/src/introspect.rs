//! Sources of observed table snapshots.

use quarry_sql_core::schema::{Database, Table};

use crate::error::Result;

/// Produces the observed state of a table, typically by reading the live
/// catalog of a running database.
pub trait Introspect {
    /// Returns the observed table, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be read.
    fn introspect_table(&self, name: &str) -> Result<Option<Table>>;
}

/// A registry snapshot, e.g. one loaded from a schema file, observed as-is.
impl Introspect for Database {
    fn introspect_table(&self, name: &str) -> Result<Option<Table>> {
        Ok(self.table(name).map(|t| t.as_ref().clone()))
    }
}

/// Observes nothing: every table is planned as new.
#[derive(Debug, Default, Clone, Copy)]
pub struct Empty;

impl Introspect for Empty {
    fn introspect_table(&self, _name: &str) -> Result<Option<Table>> {
        Ok(None)
    }
}
