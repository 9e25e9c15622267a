//! Column assignments for `INSERT`, `UPDATE` and `ON CONFLICT DO UPDATE`.

use super::expr::{expr_list, with_toggles, Arg, Ex, IntoArg, SqlExpr};
use super::select::StmtSelect;
use super::toggles::{Toggle, Toggles};
use crate::schema::Column;

#[derive(Debug, Clone)]
enum Source {
    Values(Vec<Arg>),
    Select(Box<StmtSelect>),
}

/// Values for one or more columns.
///
/// Rendered as `col = ?` by default. Under [`Toggle::UseValues`] the
/// assignment renders as `(a, b) VALUES (?,?),(?,?)`, one group per row, or
/// as `(a, b) SELECT ...`.
#[derive(Debug, Clone)]
pub struct Assignment {
    columns: Vec<Column>,
    source: Source,
}

impl Assignment {
    pub(crate) fn new(column: Column, value: impl IntoArg) -> Self {
        Self {
            columns: vec![column],
            source: Source::Values(vec![value.into_arg()]),
        }
    }

    /// Number of value rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        match &self.source {
            Source::Values(values) if self.columns.is_empty() => values.len(),
            Source::Values(values) => values.len() / self.columns.len(),
            Source::Select(_) => 1,
        }
    }

    fn columns_ex(&self) -> Ex {
        expr_list(self.columns.iter().map(|c| {
            with_toggles(c.clone(), Toggles::new().with(Toggle::MultiTable, false))
        }))
    }
}

/// Assigns `values` to `columns`, row by row.
///
/// # Panics
///
/// Panics when `columns` is empty or when the number of values is not a
/// multiple of the number of columns.
pub fn columns_and_values(
    columns: impl IntoIterator<Item = Column>,
    values: Vec<Arg>,
) -> Assignment {
    let columns: Vec<Column> = columns.into_iter().collect();
    assert!(!columns.is_empty(), "assignment without columns");
    assert!(
        values.len() % columns.len() == 0,
        "{} values cannot fill rows of {} columns",
        values.len(),
        columns.len()
    );
    Assignment {
        columns,
        source: Source::Values(values),
    }
}

/// Assigns the rows produced by `select` to `columns`.
pub fn columns_and_select(
    columns: impl IntoIterator<Item = Column>,
    select: StmtSelect,
) -> Assignment {
    Assignment {
        columns: columns.into_iter().collect(),
        source: Source::Select(Box::new(select)),
    }
}

impl SqlExpr for Assignment {
    fn is_nil(&self) -> bool {
        self.columns.is_empty()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::default();
        let columns = self.columns_ex();

        if toggles.is(Toggle::UseValues) {
            e.write_group(|e| e.write_expr(columns));
            match &self.source {
                Source::Select(select) => {
                    e.write_query_byte(' ');
                    e.write_expr(select.as_ref());
                }
                Source::Values(values) => {
                    e.write_query(" VALUES ");
                    for (i, row) in values.chunks(self.columns.len()).enumerate() {
                        if i > 0 {
                            e.write_query_byte(',');
                        }
                        e.write_group(|e| {
                            for (j, value) in row.iter().enumerate() {
                                if j > 0 {
                                    e.write_query_byte(',');
                                }
                                e.write_expr(value.clone());
                            }
                        });
                    }
                }
            }
            return e.resolve(toggles);
        }

        let single = self.columns.len() == 1;
        if single {
            e.write_expr(columns);
        } else {
            e.write_group(|e| e.write_expr(columns));
        }
        e.write_query(" = ");
        match &self.source {
            Source::Select(select) => e.write_group(|e| e.write_expr(select.as_ref())),
            Source::Values(values) if single => match values.first() {
                Some(value) => e.write_expr(value.clone()),
                None => e.write_query("NULL"),
            },
            Source::Values(values) => e.write_group(|e| {
                for (j, value) in values.iter().take(self.columns.len()).enumerate() {
                    if j > 0 {
                        e.write_query(", ");
                    }
                    e.write_expr(value.clone());
                }
            }),
        }
        e.resolve(toggles)
    }
}
