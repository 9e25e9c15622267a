//! SELECT statement builder.

use std::sync::Arc;

use super::addition::{has_join, write_additions, Addition};
use super::expr::{Arg, Ex, IntoArg, SqlExpr};
use super::toggles::{Toggle, Toggles};

/// A SELECT statement.
///
/// ```rust
/// use quarry_sql_core::builder::{limit, select_all, where_clause, SqlExpr, Toggles};
/// use quarry_sql_core::schema::{col, Table};
///
/// let t = Table::new("t_user");
/// let stmt = select_all().from(&t, [
///     limit(10).into(),
///     where_clause(col("f_age").gt(18)).into(),
/// ]);
/// let (sql, _) = stmt.ex(&Toggles::default()).build().unwrap();
/// assert_eq!(sql, "SELECT * FROM t_user\nWHERE f_age > ?\nLIMIT 10");
/// ```
#[derive(Debug, Clone)]
pub struct StmtSelect {
    projection: Option<Arc<dyn SqlExpr>>,
    distinct: bool,
    table: Option<Arg>,
    additions: Vec<Addition>,
}

/// Starts a SELECT of `projection`. A nil projection selects `*`.
pub fn select(projection: impl SqlExpr + 'static) -> StmtSelect {
    StmtSelect {
        projection: Some(Arc::new(projection)),
        distinct: false,
        table: None,
        additions: Vec::new(),
    }
}

/// Starts a `SELECT *`.
pub fn select_all() -> StmtSelect {
    StmtSelect {
        projection: None,
        distinct: false,
        table: None,
        additions: Vec::new(),
    }
}

impl StmtSelect {
    /// Sets the source table and appends `additions`.
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

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Appends one addition.
    #[must_use]
    pub fn addition(mut self, addition: impl Into<Addition>) -> Self {
        self.additions.push(addition.into());
        self
    }
}

impl SqlExpr for StmtSelect {
    fn ex(&self, toggles: &Toggles) -> Ex {
        let toggles = if has_join(&self.additions) {
            toggles.merge(&Toggles::new().with(Toggle::MultiTable, true))
        } else {
            toggles.clone()
        };

        let mut e = Ex::new("SELECT", Vec::new());
        if self.distinct {
            e.write_query(" DISTINCT");
        }

        match &self.projection {
            Some(projection) if !projection.is_nil() => {
                e.write_query_byte(' ');
                e.write_expr(Arc::clone(projection));
            }
            _ => e.write_query(" *"),
        }

        if let Some(table) = &self.table {
            e.write_query(" FROM ");
            e.write_expr(table.clone());
        }

        write_additions(&mut e, &self.additions);
        e.resolve(&toggles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{
        asc, auto_alias, expr_list, group_by, left_join, limit, order_by, union, where_clause,
        Condition, SqlValue,
    };
    use crate::expr;
    use crate::schema::{col, Column, ColumnType, FieldKind, Table};

    fn table(name: &str, columns: &[(&str, &str)]) -> Table {
        let mut t = Table::new(name);
        for (column, field) in columns {
            t.add_col(Column::new(*column, ColumnType::new(FieldKind::String)).field(*field));
        }
        t
    }

    fn render(stmt: &StmtSelect) -> (String, Vec<SqlValue>) {
        stmt.ex(&Toggles::default()).build().unwrap()
    }

    #[test]
    fn test_additions_order_is_canonical() {
        let t = Table::new("t");
        let c = col("f_a").eq(1);
        let forward = select_all().from(&t, [limit(10).into(), where_clause(c.clone()).into()]);
        let reversed = select_all().from(&t, [where_clause(c).into(), limit(10).into()]);
        assert_eq!(render(&forward), render(&reversed));
        assert_eq!(render(&forward).0, "SELECT * FROM t\nWHERE f_a = ?\nLIMIT 10");
    }

    #[test]
    fn test_nil_additions_are_skipped() {
        let t = Table::new("t");
        let stmt = select(Ex::default()).from(
            &t,
            [
                where_clause(Condition::nil()).into(),
                limit(0).into(),
                order_by(Vec::new()).into(),
            ],
        );
        assert_eq!(render(&stmt).0, "SELECT * FROM t");
    }

    #[test]
    fn test_join_forces_multi_table() {
        let user = table("t_user", &[("f_id", "ID"), ("f_org_id", "OrgID"), ("f_name", "Name")]);
        let org = table("t_org", &[("f_id", "ID"), ("f_name", "Name")]);
        let stmt = select(expr_list([user.must_f("Name"), org.must_f("Name")])).from(
            &user,
            [
                where_clause(user.must_f("Name").eq("x")).into(),
                left_join(&org)
                    .on(user.must_f("OrgID").eq(org.must_f("ID")))
                    .into(),
            ],
        );
        assert_eq!(
            render(&stmt).0,
            "SELECT t_user.f_name, t_org.f_name FROM t_user\n\
             LEFT JOIN t_org ON t_user.f_org_id = t_org.f_id\n\
             WHERE t_user.f_name = ?"
        );
    }

    #[test]
    fn test_auto_alias_projection() {
        let user = table("t_user", &[("f_id", "ID")]);
        let org = table("t_org", &[("f_id", "ID")]);
        let stmt = select(auto_alias(user.must_f("ID").clone()))
            .from(&user, [left_join(&org).using([org.must_f("ID").clone()]).into()]);
        assert_eq!(
            render(&stmt).0,
            "SELECT t_user.f_id AS f_id FROM t_user\nLEFT JOIN t_org USING (f_id)"
        );
    }

    #[test]
    fn test_distinct_group_order_union() {
        let t = table("t_user", &[("f_org_id", "OrgID")]);
        let archived = Table::new("t_user_archive");
        let stmt = select(t.must_f("OrgID").clone())
            .distinct()
            .from(&t, [order_by([asc(t.must_f("OrgID"))]).into()])
            .addition(group_by([t.must_f("OrgID")]))
            .addition(union(select(col("f_org_id")).from(&archived, [])));
        assert_eq!(
            render(&stmt).0,
            "SELECT DISTINCT f_org_id FROM t_user\n\
             GROUP BY f_org_id\n\
             UNION (SELECT f_org_id FROM t_user_archive)\n\
             ORDER BY f_org_id ASC"
        );
    }

    #[test]
    fn test_subquery_in_condition() {
        let t = Table::new("t_user");
        let banned = Table::new("t_ban");
        let stmt = select_all().from(
            &t,
            [where_clause(
                col("f_id").not_in_select(select(col("f_user_id")).from(&banned, [])),
            )
            .into()],
        );
        assert_eq!(
            render(&stmt).0,
            "SELECT * FROM t_user\nWHERE f_id NOT IN (SELECT f_user_id FROM t_ban)"
        );
    }

    #[test]
    fn test_projection_expression() {
        let stmt = select(expr!("count(?)", expr!("1"))).from(Table::new("t"), []);
        assert_eq!(render(&stmt).0, "SELECT count(1) FROM t");
    }
}
