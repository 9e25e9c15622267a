//! Database-level migration planning.

use std::fmt;

use quarry_sql_core::builder::{Ex, SqlExpr, Toggles};
use quarry_sql_core::dialect::Dialect;
use quarry_sql_core::schema::Database;
use tracing::debug;

use crate::diff::diff;
use crate::error::Result;
use crate::introspect::Introspect;

/// The statements migrating one table.
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub table: String,
    pub statements: Vec<Ex>,
}

/// Ordered statements migrating every table of a database. Tables without
/// changes are left out.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    pub steps: Vec<TablePlan>,
}

impl MigrationPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All statements in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &Ex> {
        self.steps.iter().flat_map(|step| step.statements.iter())
    }

    /// Renders the plan as a SQL script with one `-- table` header per step.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toggles = Toggles::default();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "-- {}", step.table)?;
            for statement in &step.statements {
                writeln!(f, "{}", statement.ex(&toggles).query())?;
            }
        }
        Ok(())
    }
}

/// Diffs every table registered on `database` against what `introspector`
/// observes.
///
/// # Errors
///
/// Returns the first introspection failure.
pub fn migrate(
    database: &Database,
    introspector: &dyn Introspect,
    dialect: &dyn Dialect,
) -> Result<MigrationPlan> {
    let mut plan = MigrationPlan::default();
    for table in database.tables() {
        let observed = introspector.introspect_table(&table.name)?;
        let statements = diff(&table, observed.as_ref(), dialect);
        debug!(table = %table.name, statements = statements.len(), "planned");
        if !statements.is_empty() {
            plan.steps.push(TablePlan {
                table: table.name.clone(),
                statements,
            });
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::Empty;
    use quarry_sql_core::schema::{Column, ColumnType, FieldKind, Table};
    use quarry_sql_postgres::PostgresDialect;

    fn database() -> Database {
        let db = Database::new("app");
        for name in ["t_b", "t_a"] {
            let mut t = Table::new(name);
            t.add_col(Column::new("f_id", ColumnType::new(FieldKind::Int32)));
            db.add_table(t);
        }
        db
    }

    #[test]
    fn test_plan_for_empty_database() {
        let plan = migrate(&database(), &Empty, &PostgresDialect::new()).unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.statements().count(), 2);
        assert_eq!(
            plan.to_sql(),
            "-- t_a\n\
             CREATE TABLE IF NOT EXISTS t_a (\n\tf_id integer NOT NULL\n);\n\
             \n\
             -- t_b\n\
             CREATE TABLE IF NOT EXISTS t_b (\n\tf_id integer NOT NULL\n);\n"
        );
    }

    #[test]
    fn test_plan_against_itself_is_empty() {
        let db = database();
        let plan = migrate(&db, &db, &PostgresDialect::new()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.to_sql(), "");
    }
}
