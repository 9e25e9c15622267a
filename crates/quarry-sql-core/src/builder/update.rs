//! UPDATE statement builder.

use super::addition::{where_clause, write_additions, Addition};
use super::assignment::Assignment;
use super::condition::Condition;
use super::expr::{expr_list, Arg, Ex, IntoArg, SqlExpr};
use super::toggles::Toggles;
use crate::error::BuildError;

/// An UPDATE statement.
#[derive(Debug, Clone)]
pub struct StmtUpdate {
    table: Arg,
    assignments: Vec<Assignment>,
    additions: Vec<Addition>,
}

/// Starts an UPDATE of `table`.
pub fn update(table: impl IntoArg) -> StmtUpdate {
    StmtUpdate {
        table: table.into_arg(),
        assignments: Vec::new(),
        additions: Vec::new(),
    }
}

impl StmtUpdate {
    /// Appends assignments.
    #[must_use]
    pub fn set(mut self, assignments: impl IntoIterator<Item = Assignment>) -> Self {
        self.assignments.extend(assignments);
        self
    }

    /// Adds a WHERE clause plus `additions`.
    #[must_use]
    pub fn where_clause(
        mut self,
        condition: Condition,
        additions: impl IntoIterator<Item = Addition>,
    ) -> Self {
        self.additions.push(where_clause(condition).into());
        self.additions.extend(additions);
        self
    }

    /// Appends one addition.
    #[must_use]
    pub fn addition(mut self, addition: impl Into<Addition>) -> Self {
        self.additions.push(addition.into());
        self
    }
}

impl SqlExpr for StmtUpdate {
    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("UPDATE ", Vec::new());

        if self.table.is_nil() {
            e.set_err(BuildError::MissingTable("UPDATE"));
        } else {
            e.write_expr(self.table.clone());
        }

        if self.assignments.is_empty() {
            e.set_err(BuildError::MissingAssignments);
        } else {
            e.write_query(" SET ");
            e.write_expr(expr_list(self.assignments.iter()));
        }

        write_additions(&mut e, &self.additions);
        e.resolve(toggles)
    }
}
