//! Expression core.
//!
//! An [`Ex`] is a query template with positional `?` holders and one
//! [`Arg`] per holder. Rendering an expression resolves nested expressions
//! recursively under the current [`Toggles`], explodes list arguments into
//! one holder per element and splices everything into a single flat
//! template whose arguments are all scalars.

use std::fmt;
use std::sync::Arc;

use super::toggles::{Toggle, Toggles};
use super::value::{SqlValue, ToSqlValue, ValueExpr};
use crate::error::BuildError;

/// Anything that renders to SQL.
pub trait SqlExpr: fmt::Debug + Send + Sync {
    /// Reports whether the expression renders nothing.
    ///
    /// Nil expressions are skipped by every container: a nil condition in a
    /// conjunction, a nil addition in a statement, a nil argument in a
    /// template.
    fn is_nil(&self) -> bool {
        false
    }

    /// Renders the expression under `toggles`.
    ///
    /// The returned expression is resolved: its template only holds scalar
    /// arguments.
    fn ex(&self, toggles: &Toggles) -> Ex;
}

impl<T: SqlExpr + ?Sized> SqlExpr for Arc<T> {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        (**self).ex(toggles)
    }
}

impl<T: SqlExpr + ?Sized> SqlExpr for Box<T> {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        (**self).ex(toggles)
    }
}

/// One positional argument of an [`Ex`].
#[derive(Debug, Clone)]
pub enum Arg {
    /// A scalar bound to one holder.
    Value(SqlValue),
    /// A list exploded into one holder per element.
    List(Vec<SqlValue>),
    /// A nested expression rendered in place of its holder.
    Expr(Arc<dyn SqlExpr>),
    /// A value that supplies its own one-holder fragment.
    ValueExpr(Arc<dyn ValueExpr>),
}

impl Arg {
    /// Reports whether the argument is a plain scalar.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Reports whether the argument is a nil expression.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        match self {
            Self::Expr(expr) => expr.is_nil(),
            _ => false,
        }
    }

    /// Wraps a [`ValueExpr`].
    pub fn value_expr(value: impl ValueExpr + 'static) -> Self {
        Self::ValueExpr(Arc::new(value))
    }
}

/// Conversion into an [`Arg`].
pub trait IntoArg {
    /// Converts the value into an argument.
    fn into_arg(self) -> Arg;
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}

macro_rules! scalar_args {
    ($($t:ty),*) => {
        $(
            impl IntoArg for $t {
                fn into_arg(self) -> Arg {
                    Arg::Value(self.to_sql_value())
                }
            }
        )*
    };
}

scalar_args!(
    SqlValue,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    &[u8]
);

impl<T: ToSqlValue> IntoArg for Option<T> {
    fn into_arg(self) -> Arg {
        Arg::Value(self.to_sql_value())
    }
}

macro_rules! list_args {
    ($($t:ty),*) => {
        $(
            impl IntoArg for Vec<$t> {
                fn into_arg(self) -> Arg {
                    Arg::List(self.into_iter().map(ToSqlValue::to_sql_value).collect())
                }
            }

            impl IntoArg for &[$t] {
                fn into_arg(self) -> Arg {
                    Arg::List(self.iter().cloned().map(ToSqlValue::to_sql_value).collect())
                }
            }

            impl<const N: usize> IntoArg for [$t; N] {
                fn into_arg(self) -> Arg {
                    Arg::List(self.into_iter().map(ToSqlValue::to_sql_value).collect())
                }
            }
        )*
    };
}

list_args!(SqlValue, bool, i16, i32, i64, u16, u32, f32, f64, String, &str);

impl IntoArg for Arc<dyn SqlExpr> {
    fn into_arg(self) -> Arg {
        Arg::Expr(self)
    }
}

impl IntoArg for Arc<dyn ValueExpr> {
    fn into_arg(self) -> Arg {
        Arg::ValueExpr(self)
    }
}

macro_rules! expr_args {
    ($($t:ty),*) => {
        $(
            impl IntoArg for $t {
                fn into_arg(self) -> Arg {
                    Arg::Expr(Arc::new(self))
                }
            }

            impl IntoArg for &$t {
                fn into_arg(self) -> Arg {
                    Arg::Expr(Arc::new(self.clone()))
                }
            }
        )*
    };
}

expr_args!(
    Ex,
    Toggled,
    crate::schema::Column,
    crate::schema::Columns,
    crate::schema::TableRef,
    super::Condition,
    super::Assignment,
    super::Addition,
    super::StmtSelect
);

impl IntoArg for crate::schema::Table {
    fn into_arg(self) -> Arg {
        self.table_ref().into_arg()
    }
}

impl IntoArg for &crate::schema::Table {
    fn into_arg(self) -> Arg {
        self.table_ref().into_arg()
    }
}

/// A query template plus its positional arguments.
#[derive(Debug, Clone, Default)]
pub struct Ex {
    query: String,
    args: Vec<Arg>,
    err: Option<BuildError>,
    exactly: bool,
}

impl Ex {
    /// Creates an unresolved expression.
    pub fn new(query: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            query: query.into(),
            args,
            err: None,
            exactly: false,
        }
    }

    /// Creates a resolved expression copied verbatim on every render.
    ///
    /// Any `?` in `query` is text, not a holder.
    pub fn exactly(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            args: Vec::new(),
            err: None,
            exactly: true,
        }
    }

    /// Creates an empty expression carrying `err`.
    #[must_use]
    pub fn failed(err: BuildError) -> Self {
        Self {
            err: Some(err),
            exactly: true,
            ..Self::default()
        }
    }

    /// The query template.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The positional arguments.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The scalar arguments, in holder order.
    ///
    /// Meaningful on resolved expressions, where every argument is a scalar.
    #[must_use]
    pub fn values(&self) -> Vec<SqlValue> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Value(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// The recorded build error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&BuildError> {
        self.err.as_ref()
    }

    /// Reports whether the expression is resolved.
    #[must_use]
    pub const fn is_exactly(&self) -> bool {
        self.exactly
    }

    /// Records `err` unless an earlier error is already recorded.
    pub fn set_err(&mut self, err: BuildError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Appends raw template text.
    pub fn write_query(&mut self, query: &str) {
        self.query.push_str(query);
    }

    /// Appends one raw template character.
    pub fn write_query_byte(&mut self, c: char) {
        self.query.push(c);
    }

    /// Appends a holder bound to `arg`. Nil expressions are skipped.
    ///
    /// A resolved expression keeps its text verbatim: it becomes the first
    /// nested argument so a literal `?` in it is never read as a holder.
    pub fn write_expr(&mut self, arg: impl IntoArg) {
        let arg = arg.into_arg();
        if arg.is_nil() {
            return;
        }
        if self.exactly {
            self.exactly = false;
            if !self.query.is_empty() {
                let resolved = Self {
                    query: std::mem::take(&mut self.query),
                    args: std::mem::take(&mut self.args),
                    err: None,
                    exactly: true,
                };
                self.query.push('?');
                self.args.push(Arg::Expr(Arc::new(resolved)));
            }
        }
        self.query.push('?');
        self.args.push(arg);
    }

    /// Appends text that must not be scanned for holders.
    pub fn write_literal(&mut self, text: &str) {
        self.write_expr(Self::exactly(text));
    }

    /// Writes `f`'s output between parentheses.
    pub fn write_group(&mut self, f: impl FnOnce(&mut Self)) {
        self.query.push('(');
        f(self);
        self.query.push(')');
    }

    /// Terminates the statement with `;`.
    pub fn write_end(&mut self) {
        self.query.push(';');
    }

    /// Resolves the expression under `toggles`.
    ///
    /// # Panics
    ///
    /// Panics when the number of `?` holders differs from the number of
    /// arguments, or when a [`ValueExpr`] fragment does not hold exactly
    /// one `?`.
    #[must_use]
    pub fn resolve(&self, toggles: &Toggles) -> Self {
        if self.exactly {
            return self.clone();
        }

        if self.args.iter().all(Arg::is_scalar) {
            check_holders(&self.query, self.args.len());
            return Self {
                query: self.query.clone(),
                args: self.args.clone(),
                err: self.err.clone(),
                exactly: true,
            };
        }

        let mut out = Self {
            query: String::with_capacity(self.query.len()),
            args: Vec::with_capacity(self.args.len()),
            err: self.err.clone(),
            exactly: true,
        };
        let mut args = self.args.iter();

        for c in self.query.chars() {
            if c != '?' {
                out.query.push(c);
                continue;
            }
            let Some(arg) = args.next() else {
                panic!(
                    "missing argument for `?` holder in `{}` ({} arguments)",
                    self.query,
                    self.args.len()
                );
            };
            match arg {
                Arg::Value(value) => {
                    out.query.push('?');
                    out.args.push(Arg::Value(value.clone()));
                }
                Arg::List(values) if values.is_empty() => out.query.push_str("NULL"),
                Arg::List(values) => {
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            out.query.push(',');
                        }
                        out.query.push('?');
                        out.args.push(Arg::Value(value.clone()));
                    }
                }
                Arg::Expr(expr) => {
                    if expr.is_nil() {
                        continue;
                    }
                    out.splice(expr.ex(toggles), toggles);
                }
                Arg::ValueExpr(value) => {
                    let fragment = value.value_ex();
                    check_holders(&fragment, 1);
                    out.query.push_str(&fragment);
                    out.args.push(Arg::Value(value.value()));
                }
            }
        }

        let extra = args.count();
        assert!(
            extra == 0,
            "{extra} arguments left without a `?` holder in `{}`",
            self.query
        );

        out
    }

    /// Resolves with default toggles and extracts the query and its values.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] recorded anywhere in the expression
    /// tree.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>), BuildError> {
        let resolved = self.resolve(&Toggles::default());
        if let Some(err) = resolved.err {
            return Err(err);
        }
        let values = resolved.values();
        Ok((resolved.query, values))
    }

    fn splice(&mut self, sub: Self, toggles: &Toggles) {
        let sub = if sub.exactly {
            sub
        } else {
            sub.resolve(toggles)
        };
        self.query.push_str(&sub.query);
        self.args.extend(sub.args);
        if self.err.is_none() {
            self.err = sub.err;
        }
    }
}

impl SqlExpr for Ex {
    fn is_nil(&self) -> bool {
        self.query.is_empty() && self.err.is_none()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        self.resolve(toggles)
    }
}

fn check_holders(query: &str, expected: usize) {
    let holders = query.matches('?').count();
    assert!(
        holders == expected,
        "`{query}` holds {holders} `?` holders but {expected} arguments were given"
    );
}

/// Builds an unresolved [`Ex`] from a template and its arguments.
///
/// ```rust
/// use quarry_sql_core::expr;
///
/// let (sql, values) = expr!("f_id IN (?)", vec![1, 2, 3]).build().unwrap();
/// assert_eq!(sql, "f_id IN (?,?,?)");
/// assert_eq!(values.len(), 3);
/// ```
#[macro_export]
macro_rules! expr {
    ($query:expr) => {
        $crate::builder::Ex::new($query, ::std::vec::Vec::new())
    };
    ($query:expr, $($arg:expr),+ $(,)?) => {
        $crate::builder::Ex::new(
            $query,
            ::std::vec![$($crate::builder::IntoArg::into_arg($arg)),+],
        )
    };
}

/// Collects values of mixed types into a `Vec<Arg>`.
///
/// ```rust
/// use quarry_sql_core::args;
///
/// let row = args![1, "x", None::<i64>];
/// assert_eq!(row.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        ::std::vec![$($crate::builder::IntoArg::into_arg($arg)),*]
    };
}

/// An expression rendered under extra toggles.
#[derive(Debug, Clone)]
pub struct Toggled {
    inner: Arc<dyn SqlExpr>,
    toggles: Toggles,
}

/// Renders `expr` with `toggles` merged over the inherited ones.
pub fn with_toggles(expr: impl SqlExpr + 'static, toggles: Toggles) -> Toggled {
    Toggled {
        inner: Arc::new(expr),
        toggles,
    }
}

/// Renders qualified columns inside `expr` as `t.col AS col`.
pub fn auto_alias(expr: impl SqlExpr + 'static) -> Toggled {
    with_toggles(expr, Toggles::new().with(Toggle::NeedAutoAlias, true))
}

impl SqlExpr for Toggled {
    fn is_nil(&self) -> bool {
        self.inner.is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        self.inner.ex(&toggles.merge(&self.toggles))
    }
}

/// Joins the non-nil items with `", "`.
pub fn expr_list<I>(items: I) -> Ex
where
    I: IntoIterator,
    I::Item: IntoArg,
{
    let mut e = Ex::default();
    for arg in items.into_iter().map(IntoArg::into_arg) {
        if arg.is_nil() {
            continue;
        }
        if !e.args.is_empty() {
            e.write_query(", ");
        }
        e.write_expr(arg);
    }
    e
}
