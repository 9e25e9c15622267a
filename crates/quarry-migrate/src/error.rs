//! Error types for migration planning.

use std::path::PathBuf;

use quarry_sql_core::error::{SchemaError, SqlError};

/// Errors that can occur while loading schemas or planning migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// IO error reading a schema file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A schema file is not valid JSON for the expected format.
    #[error("Failed to parse schema file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A column declaration has an unknown kind or a malformed flag.
    #[error("Invalid column '{table}.{column}': {source}")]
    Column {
        table: String,
        column: String,
        #[source]
        source: SchemaError,
    },

    /// A key refers to a field no column declares.
    #[error("Key '{key}' of table '{table}' refers to undeclared field '{field}'")]
    UnknownField {
        table: String,
        key: String,
        field: String,
    },

    /// A table declares more than one auto-increment column.
    #[error("Table '{table}' declares '{column}' auto-increment but '{existing}' already is")]
    DuplicateAutoIncrement {
        table: String,
        column: String,
        existing: String,
    },

    /// A deprecated column is renamed to a column the table does not declare.
    #[error("Column '{table}.{column}' is renamed to undeclared column '{target}'")]
    UnknownRenameTarget {
        table: String,
        column: String,
        target: String,
    },

    /// A table was requested that the schema does not declare.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Database error while introspecting or applying a plan.
    #[error("Database error: {0}")]
    Database(#[from] SqlError),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
