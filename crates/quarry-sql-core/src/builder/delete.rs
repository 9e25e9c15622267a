//! DELETE statement builder.

use super::addition::{write_additions, Addition};
use super::expr::{Arg, Ex, IntoArg, SqlExpr};
use super::toggles::Toggles;
use crate::error::BuildError;

/// A DELETE statement.
#[derive(Debug, Clone, Default)]
pub struct StmtDelete {
    table: Option<Arg>,
    additions: Vec<Addition>,
}

/// Starts a DELETE.
pub fn delete() -> StmtDelete {
    StmtDelete::default()
}

impl StmtDelete {
    /// Sets the target table and appends `additions`.
    #[must_use]
    pub fn from(
        mut self,
        table: impl IntoArg,
        additions: impl IntoIterator<Item = Addition>,
    ) -> Self {
        self.table = Some(table.into_arg());
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

impl SqlExpr for StmtDelete {
    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("DELETE FROM ", Vec::new());
        match &self.table {
            Some(table) if !table.is_nil() => e.write_expr(table.clone()),
            _ => e.set_err(BuildError::MissingTable("DELETE")),
        }
        write_additions(&mut e, &self.additions);
        e.resolve(toggles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{limit, where_clause};
    use crate::schema::{col, Table};

    #[test]
    fn test_delete() {
        let t = Table::new("t_session").with_schema("auth");
        let stmt = delete().from(
            &t,
            [
                limit(100).into(),
                where_clause(col("f_expired").eq(true)).into(),
            ],
        );
        let (sql, _) = stmt.ex(&Toggles::default()).build().unwrap();
        assert_eq!(sql, "DELETE FROM auth.t_session\nWHERE f_expired = ?\nLIMIT 100");
    }

    #[test]
    fn test_delete_without_table() {
        assert_eq!(
            delete().ex(&Toggles::default()).build(),
            Err(BuildError::MissingTable("DELETE"))
        );
    }
}
