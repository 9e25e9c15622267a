//! Columns and column predicates.

use super::column_type::{ColumnType, FieldKind};
use crate::builder::{
    Assignment, Condition, Ex, IntoArg, SqlExpr, StmtSelect, Toggle, Toggles,
};
use crate::error::SchemaError;
use crate::expr;

/// The name and schema of a table, used to qualify columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub schema: String,
}

impl SqlExpr for TableRef {
    fn ex(&self, _: &Toggles) -> Ex {
        if self.schema.is_empty() {
            Ex::exactly(self.name.clone())
        } else {
            Ex::exactly(format!("{}.{}", self.schema, self.name))
        }
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Name of the model field the column is declared by.
    pub field_name: String,
    pub column_type: ColumnType,
    table: Option<TableRef>,
}

/// A free-standing column reference with no owning table.
pub fn col(name: impl Into<String>) -> Column {
    Column::new(name, ColumnType::new(FieldKind::String))
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            field_name: String::new(),
            column_type,
            table: None,
        }
    }

    /// Parses a `name,flag,flag=value` tag into a column of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyTag`] when the tag has no name, and any
    /// error raised by [`ColumnType::with_flags`].
    pub fn from_tag(
        field_name: impl Into<String>,
        kind: FieldKind,
        tag: &str,
    ) -> Result<Self, SchemaError> {
        let (name, flags) = tag.split_once(',').unwrap_or((tag, ""));
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyTag);
        }
        let column_type = ColumnType::new(kind).with_flags(flags)?;
        Ok(Self::new(name, column_type).field(field_name))
    }

    /// Sets the declaring model field name.
    #[must_use]
    pub fn field(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    /// The owning table, if the column belongs to one.
    #[must_use]
    pub const fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    pub(crate) fn attach(&mut self, table: TableRef) {
        self.table = Some(table);
    }

    /// Reports whether the column is deprecated.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        self.column_type.deprecated.is_some()
    }

    fn compare(&self, op: &str, value: impl IntoArg) -> Condition {
        Condition::new(Ex::new(
            format!("? {op} ?"),
            vec![self.into_arg(), value.into_arg()],
        ))
    }

    /// `col = ?`
    pub fn eq(&self, value: impl IntoArg) -> Condition {
        self.compare("=", value)
    }

    /// `col <> ?`
    pub fn neq(&self, value: impl IntoArg) -> Condition {
        self.compare("<>", value)
    }

    pub fn gt(&self, value: impl IntoArg) -> Condition {
        self.compare(">", value)
    }

    pub fn gte(&self, value: impl IntoArg) -> Condition {
        self.compare(">=", value)
    }

    pub fn lt(&self, value: impl IntoArg) -> Condition {
        self.compare("<", value)
    }

    pub fn lte(&self, value: impl IntoArg) -> Condition {
        self.compare("<=", value)
    }

    pub fn between(&self, low: impl IntoArg, high: impl IntoArg) -> Condition {
        Condition::new(expr!("? BETWEEN ? AND ?", self, low, high))
    }

    pub fn not_between(&self, low: impl IntoArg, high: impl IntoArg) -> Condition {
        Condition::new(expr!("? NOT BETWEEN ? AND ?", self, low, high))
    }

    /// `col LIKE '%text%'`
    pub fn like(&self, text: &str) -> Condition {
        self.compare("LIKE", format!("%{text}%"))
    }

    /// `col LIKE '%text'`
    pub fn l_like(&self, text: &str) -> Condition {
        self.compare("LIKE", format!("%{text}"))
    }

    /// `col LIKE 'text%'`
    pub fn r_like(&self, text: &str) -> Condition {
        self.compare("LIKE", format!("{text}%"))
    }

    /// `col NOT LIKE '%text%'`
    pub fn not_like(&self, text: &str) -> Condition {
        self.compare("NOT LIKE", format!("%{text}%"))
    }

    pub fn is_null(&self) -> Condition {
        Condition::new(expr!("? IS NULL", self))
    }

    pub fn is_not_null(&self) -> Condition {
        Condition::new(expr!("? IS NOT NULL", self))
    }

    fn membership(&self, op: &str, values: Vec<crate::builder::Arg>) -> Condition {
        if values.is_empty() {
            return Condition::nil();
        }
        let mut e = Ex::default();
        e.write_expr(self);
        e.write_query_byte(' ');
        e.write_query(op);
        e.write_query(" (");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                e.write_query_byte(',');
            }
            e.write_expr(value);
        }
        e.write_query_byte(')');
        Condition::new(e)
    }

    /// `col IN (?,?,...)`. No values means no constraint.
    pub fn in_list<I>(&self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: IntoArg,
    {
        self.membership("IN", values.into_iter().map(IntoArg::into_arg).collect())
    }

    /// `col NOT IN (?,?,...)`. No values means no constraint.
    pub fn not_in<I>(&self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: IntoArg,
    {
        self.membership("NOT IN", values.into_iter().map(IntoArg::into_arg).collect())
    }

    /// `col IN (SELECT ...)`
    pub fn in_select(&self, select: StmtSelect) -> Condition {
        Condition::new(expr!("? IN (?)", self, select))
    }

    /// `col NOT IN (SELECT ...)`
    pub fn not_in_select(&self, select: StmtSelect) -> Condition {
        Condition::new(expr!("? NOT IN (?)", self, select))
    }

    /// `col = ?`
    pub fn value_by(&self, value: impl IntoArg) -> Assignment {
        Assignment::new(self.clone(), value)
    }

    /// `col = col + ?`
    pub fn incr(&self, delta: impl IntoArg) -> Assignment {
        self.value_by(expr!("? + ?", self, delta))
    }

    /// `col = col - ?`
    pub fn desc(&self, delta: impl IntoArg) -> Assignment {
        self.value_by(expr!("? - ?", self, delta))
    }
}

impl SqlExpr for Column {
    fn ex(&self, toggles: &Toggles) -> Ex {
        match &self.table {
            Some(table) if toggles.is(Toggle::MultiTable) => {
                if toggles.is(Toggle::NeedAutoAlias) {
                    Ex::exactly(format!("{}.{} AS {}", table.name, self.name, self.name))
                } else {
                    Ex::exactly(format!("{}.{}", table.name, self.name))
                }
            }
            _ => Ex::exactly(self.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SqlValue;

    fn owned(name: &str) -> Column {
        let mut c = col(name);
        c.attach(TableRef {
            name: String::from("t_user"),
            schema: String::new(),
        });
        c
    }

    #[test]
    fn test_qualification_follows_toggles() {
        let c = owned("f_name");
        let multi = Toggles::new().with(Toggle::MultiTable, true);
        assert_eq!(c.ex(&Toggles::default()).query(), "f_name");
        assert_eq!(c.ex(&multi).query(), "t_user.f_name");
        assert_eq!(
            c.ex(&multi.with(Toggle::NeedAutoAlias, true)).query(),
            "t_user.f_name AS f_name"
        );
        assert_eq!(
            col("f_free").ex(&Toggles::new().with(Toggle::MultiTable, true)).query(),
            "f_free"
        );
    }

    #[test]
    fn test_like_variants() {
        let c = col("f_name");
        let render = |cond: Condition| cond.ex(&Toggles::default()).build().unwrap();
        assert_eq!(
            render(c.l_like("x")),
            (String::from("f_name LIKE ?"), vec![SqlValue::Text(String::from("%x"))])
        );
        assert_eq!(
            render(c.r_like("x")).1,
            vec![SqlValue::Text(String::from("x%"))]
        );
        assert_eq!(render(c.not_like("x")).0, "f_name NOT LIKE ?");
    }

    #[test]
    fn test_in_list() {
        let (sql, values) = col("f_id")
            .in_list([1, 2, 3])
            .ex(&Toggles::default())
            .build()
            .unwrap();
        assert_eq!(sql, "f_id IN (?,?,?)");
        assert_eq!(values.len(), 3);
        assert!(col("f_id").in_list(Vec::<i32>::new()).is_nil());
        assert!(col("f_id").not_in(Vec::<String>::new()).is_nil());
    }

    #[test]
    fn test_between() {
        let (sql, values) = col("f_age")
            .not_between(18, 65)
            .ex(&Toggles::default())
            .build()
            .unwrap();
        assert_eq!(sql, "f_age NOT BETWEEN ? AND ?");
        assert_eq!(values, vec![SqlValue::Int(18), SqlValue::Int(65)]);
    }

    #[test]
    fn test_from_tag() {
        let c = Column::from_tag("Name", FieldKind::String, "f_name,size=64,null").unwrap();
        assert_eq!(c.name, "f_name");
        assert_eq!(c.field_name, "Name");
        assert_eq!(c.column_type.length, 64);
        assert!(c.column_type.null);
        assert_eq!(
            Column::from_tag("Name", FieldKind::String, ",size=1"),
            Err(SchemaError::EmptyTag)
        );
    }
}
