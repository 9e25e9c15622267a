//! Error types.
//!
//! Programmer errors while building expressions (holder/argument mismatch,
//! undeclared fields, a second auto-increment column) panic. Structural
//! problems of a statement are recorded in the [`Ex`](crate::builder::Ex)
//! error slot as a [`BuildError`]. Driver errors are classified into
//! [`SqlError`] through the active [`Dialect`].

use std::error::Error as StdError;

use thiserror::Error;

use crate::dialect::Dialect;

/// Boxed driver error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A statement that cannot be rendered into valid SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{0} statement has no target table")]
    MissingTable(&'static str),

    #[error("UPDATE statement has no assignments")]
    MissingAssignments,

    #[error("INSERT statement has no values")]
    MissingValues,
}

/// Errors raised while reading schema metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("column flag `{0}` needs a value")]
    MissingFlagValue(String),

    #[error("invalid value `{value}` for column flag `{flag}`")]
    InvalidFlagValue { flag: String, value: String },

    #[error("unknown field kind `{0}`")]
    UnknownKind(String),

    #[error("empty column tag")]
    EmptyTag,
}

/// A classified database error.
#[derive(Debug, Error)]
pub enum SqlError {
    #[error("failed to build statement: {0}")]
    Build(#[from] BuildError),

    #[error("record not found")]
    NotFound(#[source] BoxError),

    #[error("conflict: {0}")]
    Conflict(#[source] BoxError),

    #[error("unknown database: {0}")]
    UnknownDatabase(#[source] BoxError),

    #[error(transparent)]
    Other(BoxError),
}

impl SqlError {
    /// Classifies a driver error with `dialect`'s predicates.
    pub fn classify(dialect: &dyn Dialect, err: impl Into<BoxError>) -> Self {
        let err = err.into();
        let view: &(dyn StdError + 'static) = &*err;
        if dialect.is_error_not_found(view) {
            Self::NotFound(err)
        } else if dialect.is_error_conflict(view) {
            Self::Conflict(err)
        } else if dialect.is_error_unknown_database(view) {
            Self::UnknownDatabase(err)
        } else {
            Self::Other(err)
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    #[must_use]
    pub const fn is_unknown_database(&self) -> bool {
        matches!(self, Self::UnknownDatabase(_))
    }
}

/// Maps a classified error onto caller-chosen errors per kind.
///
/// ```rust
/// use quarry_sql_core::error::{DbErr, SqlError};
///
/// #[derive(Debug, PartialEq)]
/// enum AppError {
///     NoSuchUser,
///     Db(String),
/// }
///
/// impl From<SqlError> for AppError {
///     fn from(err: SqlError) -> Self {
///         Self::Db(err.to_string())
///     }
/// }
///
/// let err = SqlError::NotFound("no rows".into());
/// let mapped: AppError = DbErr::new(err)
///     .when_not_found(|| AppError::NoSuchUser)
///     .into_err();
/// assert_eq!(mapped, AppError::NoSuchUser);
/// ```
#[derive(Debug)]
pub struct DbErr<E> {
    err: SqlError,
    mapped: Option<E>,
}

impl<E: From<SqlError>> DbErr<E> {
    #[must_use]
    pub const fn new(err: SqlError) -> Self {
        Self { err, mapped: None }
    }

    /// Uses `fallback` when the error is a not-found error.
    #[must_use]
    pub fn when_not_found(mut self, fallback: impl FnOnce() -> E) -> Self {
        if self.mapped.is_none() && self.err.is_not_found() {
            self.mapped = Some(fallback());
        }
        self
    }

    /// Uses `fallback` when the error is a uniqueness conflict.
    #[must_use]
    pub fn when_conflict(mut self, fallback: impl FnOnce() -> E) -> Self {
        if self.mapped.is_none() && self.err.is_conflict() {
            self.mapped = Some(fallback());
        }
        self
    }

    /// Returns the first matching fallback, or the converted original error.
    pub fn into_err(self) -> E {
        match self.mapped {
            Some(mapped) => mapped,
            None => E::from(self.err),
        }
    }
}
