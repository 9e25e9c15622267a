//! Executes built statements through sqlx.
//!
//! Every helper builds the expression, rewrites its holders with [`rebind`],
//! binds the collected values in order and maps driver failures through
//! [`SqlError::classify`] with the PostgreSQL dialect.

use quarry_sql_core::builder::{Ex, SqlExpr, SqlValue, Toggles};
use quarry_sql_core::error::SqlError;
use sqlx::postgres::{PgArguments, PgPool, PgQueryResult, PgRow};
use sqlx::query::Query;
use sqlx::{Executor, Postgres};
use tracing::debug;

use crate::dialect::PostgresDialect;
use crate::rebind::rebind;

/// Builds `stmt` into PostgreSQL text and its positional values.
///
/// # Errors
///
/// Returns [`SqlError::Build`] when the expression recorded a build error.
pub fn prepare(stmt: &dyn SqlExpr) -> Result<(String, Vec<SqlValue>), SqlError> {
    let (query, values) = stmt.ex(&Toggles::default()).build()?;
    if values.is_empty() {
        return Ok((query, values));
    }
    Ok((rebind(&query), values))
}

fn bind(sql: &str, values: Vec<SqlValue>) -> Query<'_, Postgres, PgArguments> {
    values
        .into_iter()
        .fold(sqlx::query(sql), |query, value| match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(b),
            SqlValue::Int(n) => query.bind(n),
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Blob(b) => query.bind(b),
        })
}

fn classify(err: sqlx::Error) -> SqlError {
    SqlError::classify(&PostgresDialect, err)
}

/// Connects a pool to `url`.
///
/// # Errors
///
/// A database missing on the server surfaces as
/// [`SqlError::UnknownDatabase`].
pub async fn connect(url: &str) -> Result<PgPool, SqlError> {
    PgPool::connect(url).await.map_err(classify)
}

/// Executes `stmt` and returns the driver result.
///
/// # Errors
///
/// Returns the build error or the classified driver error.
pub async fn execute<'c, E>(executor: E, stmt: &dyn SqlExpr) -> Result<PgQueryResult, SqlError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (sql, values) = prepare(stmt)?;
    debug!(sql = %sql, params = values.len(), "execute");
    bind(&sql, values).execute(executor).await.map_err(classify)
}

/// Fetches every row produced by `stmt`.
///
/// # Errors
///
/// Returns the build error or the classified driver error.
pub async fn fetch_all<'c, E>(executor: E, stmt: &dyn SqlExpr) -> Result<Vec<PgRow>, SqlError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (sql, values) = prepare(stmt)?;
    debug!(sql = %sql, params = values.len(), "fetch all");
    bind(&sql, values).fetch_all(executor).await.map_err(classify)
}

/// Fetches exactly one row.
///
/// # Errors
///
/// An empty result surfaces as [`SqlError::NotFound`].
pub async fn fetch_one<'c, E>(executor: E, stmt: &dyn SqlExpr) -> Result<PgRow, SqlError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (sql, values) = prepare(stmt)?;
    debug!(sql = %sql, params = values.len(), "fetch one");
    bind(&sql, values).fetch_one(executor).await.map_err(classify)
}

/// Fetches at most one row.
///
/// # Errors
///
/// Returns the build error or the classified driver error.
pub async fn fetch_optional<'c, E>(
    executor: E,
    stmt: &dyn SqlExpr,
) -> Result<Option<PgRow>, SqlError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (sql, values) = prepare(stmt)?;
    debug!(sql = %sql, params = values.len(), "fetch optional");
    bind(&sql, values)
        .fetch_optional(executor)
        .await
        .map_err(classify)
}

/// Runs `statements` in order inside one transaction and returns the total
/// number of affected rows. Nil statements are skipped.
///
/// # Errors
///
/// The transaction is rolled back on the first failing statement.
pub async fn execute_all(pool: &PgPool, statements: &[Ex]) -> Result<u64, SqlError> {
    let mut tx = pool.begin().await.map_err(classify)?;
    let mut affected = 0;
    for stmt in statements.iter().filter(|s| !s.is_nil()) {
        affected += execute(&mut *tx, stmt).await?.rows_affected();
    }
    tx.commit().await.map_err(classify)?;
    debug!(statements = statements.len(), affected, "committed");
    Ok(affected)
}
