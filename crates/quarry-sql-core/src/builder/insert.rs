//! INSERT statement builder.

use super::addition::{write_additions, Addition};
use super::assignment::{columns_and_select, columns_and_values, Assignment};
use super::expr::{with_toggles, Arg, Ex, IntoArg, SqlExpr};
use super::select::StmtSelect;
use super::toggles::{Toggle, Toggles};
use crate::error::BuildError;
use crate::schema::Column;

/// An INSERT statement.
#[derive(Debug, Clone, Default)]
pub struct StmtInsert {
    table: Option<Arg>,
    assignments: Vec<Assignment>,
    additions: Vec<Addition>,
}

/// Starts an INSERT.
pub fn insert() -> StmtInsert {
    StmtInsert::default()
}

impl StmtInsert {
    /// Sets the target table and appends `additions`.
    #[must_use]
    pub fn into_table(
        mut self,
        table: impl IntoArg,
        additions: impl IntoIterator<Item = Addition>,
    ) -> Self {
        self.table = Some(table.into_arg());
        self.additions.extend(additions);
        self
    }

    /// Inserts rows of `values` into `columns`.
    ///
    /// # Panics
    ///
    /// Panics when the number of values is not a multiple of the number of
    /// columns.
    #[must_use]
    pub fn values(mut self, columns: impl IntoIterator<Item = Column>, values: Vec<Arg>) -> Self {
        self.assignments = vec![columns_and_values(columns, values)];
        self
    }

    /// Inserts the rows produced by `select`.
    #[must_use]
    pub fn select(mut self, columns: impl IntoIterator<Item = Column>, select: StmtSelect) -> Self {
        self.assignments = vec![columns_and_select(columns, select)];
        self
    }

    /// Appends one addition.
    #[must_use]
    pub fn addition(mut self, addition: impl Into<Addition>) -> Self {
        self.additions.push(addition.into());
        self
    }
}

impl SqlExpr for StmtInsert {
    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("INSERT INTO ", Vec::new());

        match &self.table {
            Some(table) if !table.is_nil() => e.write_expr(table.clone()),
            _ => e.set_err(BuildError::MissingTable("INSERT")),
        }

        if self.assignments.iter().all(|a| a.rows() == 0) {
            e.set_err(BuildError::MissingValues);
        }
        let use_values = Toggles::new().with(Toggle::UseValues, true);
        for assignment in &self.assignments {
            e.write_query_byte(' ');
            e.write_expr(with_toggles(assignment.clone(), use_values.clone()));
        }

        write_additions(&mut e, &self.additions);
        e.resolve(toggles)
    }
}
