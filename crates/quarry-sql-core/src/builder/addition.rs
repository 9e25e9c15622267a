//! Statement additions: the optional clauses following a statement head.
//!
//! Additions are stored in the order they were given and rendered in the
//! canonical clause order of [`AdditionKind`], one per line.

use std::sync::Arc;

use super::assignment::Assignment;
use super::condition::Condition;
use super::expr::{expr_list, with_toggles, Arg, Ex, IntoArg, SqlExpr};
use super::join::Join;
use super::select::StmtSelect;
use super::toggles::{Toggle, Toggles};
use crate::schema::Column;

/// Clause kinds, declared in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdditionKind {
    Join,
    Where,
    GroupBy,
    Combination,
    OrderBy,
    Limit,
    OnConflict,
    Other,
    Comment,
}

/// One optional statement clause.
#[derive(Debug, Clone)]
pub enum Addition {
    Join(Join),
    Where(Where),
    GroupBy(GroupBy),
    Combination(Combination),
    OrderBy(OrderBy),
    Limit(Limit),
    OnConflict(OnConflict),
    Other(Arc<dyn SqlExpr>),
    Comment(Comment),
}

impl Addition {
    #[must_use]
    pub const fn kind(&self) -> AdditionKind {
        match self {
            Self::Join(_) => AdditionKind::Join,
            Self::Where(_) => AdditionKind::Where,
            Self::GroupBy(_) => AdditionKind::GroupBy,
            Self::Combination(_) => AdditionKind::Combination,
            Self::OrderBy(_) => AdditionKind::OrderBy,
            Self::Limit(_) => AdditionKind::Limit,
            Self::OnConflict(_) => AdditionKind::OnConflict,
            Self::Other(_) => AdditionKind::Other,
            Self::Comment(_) => AdditionKind::Comment,
        }
    }

    fn inner(&self) -> &dyn SqlExpr {
        match self {
            Self::Join(a) => a,
            Self::Where(a) => a,
            Self::GroupBy(a) => a,
            Self::Combination(a) => a,
            Self::OrderBy(a) => a,
            Self::Limit(a) => a,
            Self::OnConflict(a) => a,
            Self::Other(a) => a.as_ref(),
            Self::Comment(a) => a,
        }
    }
}

impl SqlExpr for Addition {
    fn is_nil(&self) -> bool {
        self.inner().is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        self.inner().ex(toggles)
    }
}

macro_rules! into_addition {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Addition {
                fn from(addition: $variant) -> Self {
                    Self::$variant(addition)
                }
            }
        )*
    };
}

into_addition!(Join, Where, GroupBy, Combination, OrderBy, Limit, OnConflict, Comment);

/// Writes the non-nil additions in canonical order, one per line.
pub(crate) fn write_additions(e: &mut Ex, additions: &[Addition]) {
    let mut sorted: Vec<&Addition> = additions.iter().filter(|a| !a.is_nil()).collect();
    sorted.sort_by_key(|a| a.kind());
    for addition in sorted {
        e.write_query_byte('\n');
        e.write_expr(addition);
    }
}

pub(crate) fn has_join(additions: &[Addition]) -> bool {
    additions
        .iter()
        .any(|a| a.kind() == AdditionKind::Join && !a.is_nil())
}

fn bare_columns(columns: &[Column]) -> Ex {
    expr_list(columns.iter().map(|c| {
        with_toggles(c.clone(), Toggles::new().with(Toggle::MultiTable, false))
    }))
}

// ============================================================================
// WHERE
// ============================================================================

/// `WHERE <condition>`. Nil when the condition is nil.
#[derive(Debug, Clone)]
pub struct Where(Condition);

pub fn where_clause(condition: Condition) -> Where {
    Where(condition)
}

impl SqlExpr for Where {
    fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("WHERE ", Vec::new());
        e.write_expr(&self.0);
        e.resolve(toggles)
    }
}

// ============================================================================
// GROUP BY
// ============================================================================

/// `GROUP BY <exprs> [HAVING <condition>]`.
#[derive(Debug, Clone)]
pub struct GroupBy {
    exprs: Vec<Arg>,
    having: Condition,
}

pub fn group_by<I>(exprs: I) -> GroupBy
where
    I: IntoIterator,
    I::Item: IntoArg,
{
    GroupBy {
        exprs: exprs.into_iter().map(IntoArg::into_arg).collect(),
        having: Condition::nil(),
    }
}

impl GroupBy {
    #[must_use]
    pub fn having(mut self, condition: Condition) -> Self {
        self.having = condition;
        self
    }
}

impl SqlExpr for GroupBy {
    fn is_nil(&self) -> bool {
        self.exprs.iter().all(Arg::is_nil)
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("GROUP BY ", Vec::new());
        e.write_expr(expr_list(self.exprs.iter().cloned()));
        if !self.having.is_nil() {
            e.write_query(" HAVING ");
            e.write_expr(&self.having);
        }
        e.resolve(toggles)
    }
}

// ============================================================================
// UNION / INTERSECT / EXCEPT
// ============================================================================

/// A set operation with another select.
#[derive(Debug, Clone)]
pub struct Combination {
    operator: &'static str,
    select: Box<StmtSelect>,
}

pub fn union(select: StmtSelect) -> Combination {
    combine("UNION", select)
}

pub fn union_all(select: StmtSelect) -> Combination {
    combine("UNION ALL", select)
}

pub fn intersect(select: StmtSelect) -> Combination {
    combine("INTERSECT", select)
}

pub fn except(select: StmtSelect) -> Combination {
    combine("EXCEPT", select)
}

fn combine(operator: &'static str, select: StmtSelect) -> Combination {
    Combination {
        operator,
        select: Box::new(select),
    }
}

impl SqlExpr for Combination {
    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new(self.operator, Vec::new());
        e.write_query_byte(' ');
        e.write_group(|e| e.write_expr(self.select.as_ref()));
        e.resolve(toggles)
    }
}

// ============================================================================
// ORDER BY
// ============================================================================

/// One ordering term.
#[derive(Debug, Clone)]
pub struct Order {
    target: Arg,
    direction: Option<&'static str>,
}

/// Orders by `target` with the engine's default direction.
pub fn order(target: impl IntoArg) -> Order {
    Order {
        target: target.into_arg(),
        direction: None,
    }
}

pub fn asc(target: impl IntoArg) -> Order {
    Order {
        direction: Some("ASC"),
        ..order(target)
    }
}

pub fn desc(target: impl IntoArg) -> Order {
    Order {
        direction: Some("DESC"),
        ..order(target)
    }
}

impl SqlExpr for Order {
    fn is_nil(&self) -> bool {
        self.target.is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::default();
        e.write_expr(self.target.clone());
        if let Some(direction) = self.direction {
            e.write_query_byte(' ');
            e.write_query(direction);
        }
        e.resolve(toggles)
    }
}

/// `ORDER BY <orders>`.
#[derive(Debug, Clone)]
pub struct OrderBy(Vec<Order>);

pub fn order_by(orders: impl IntoIterator<Item = Order>) -> OrderBy {
    OrderBy(orders.into_iter().collect())
}

impl SqlExpr for OrderBy {
    fn is_nil(&self) -> bool {
        self.0.iter().all(SqlExpr::is_nil)
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("ORDER BY ", Vec::new());
        e.write_expr(expr_list(self.0.iter().map(|o| Arg::Expr(Arc::new(o.clone())))));
        e.resolve(toggles)
    }
}

// ============================================================================
// LIMIT
// ============================================================================

/// `LIMIT n [OFFSET m]`. Nil when `n` is zero.
#[derive(Debug, Clone, Copy)]
pub struct Limit {
    rows: u64,
    offset: u64,
}

pub const fn limit(rows: u64) -> Limit {
    Limit { rows, offset: 0 }
}

impl Limit {
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

impl SqlExpr for Limit {
    fn is_nil(&self) -> bool {
        self.rows == 0
    }

    fn ex(&self, _: &Toggles) -> Ex {
        if self.offset > 0 {
            Ex::exactly(format!("LIMIT {} OFFSET {}", self.rows, self.offset))
        } else {
            Ex::exactly(format!("LIMIT {}", self.rows))
        }
    }
}

// ============================================================================
// ON CONFLICT
// ============================================================================

#[derive(Debug, Clone)]
enum ConflictAction {
    Nothing,
    Update(Vec<Assignment>),
}

/// `ON CONFLICT (<cols>) DO NOTHING | DO UPDATE SET ...`.
#[derive(Debug, Clone)]
pub struct OnConflict {
    columns: Vec<Column>,
    action: ConflictAction,
}

/// Resolves conflicts on `columns`; does nothing unless
/// [`OnConflict::do_update_set`] is called.
pub fn on_conflict(columns: impl IntoIterator<Item = Column>) -> OnConflict {
    OnConflict {
        columns: columns.into_iter().collect(),
        action: ConflictAction::Nothing,
    }
}

impl OnConflict {
    #[must_use]
    pub fn do_nothing(mut self) -> Self {
        self.action = ConflictAction::Nothing;
        self
    }

    #[must_use]
    pub fn do_update_set(mut self, assignments: impl IntoIterator<Item = Assignment>) -> Self {
        self.action = ConflictAction::Update(assignments.into_iter().collect());
        self
    }
}

impl SqlExpr for OnConflict {
    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("ON CONFLICT ", Vec::new());
        e.write_group(|e| e.write_expr(bare_columns(&self.columns)));
        match &self.action {
            ConflictAction::Update(assignments) if !assignments.is_empty() => {
                e.write_query(" DO UPDATE SET ");
                e.write_expr(expr_list(assignments.iter()));
            }
            _ => e.write_query(" DO NOTHING"),
        }
        e.resolve(&toggles.merge(&Toggles::new().with(Toggle::UseValues, false)))
    }
}

// ============================================================================
// Other clauses
// ============================================================================

#[derive(Debug, Clone)]
struct Returning(Arg);

impl SqlExpr for Returning {
    fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new("RETURNING ", Vec::new());
        e.write_expr(self.0.clone());
        e.resolve(toggles)
    }
}

/// `RETURNING <expr>`.
pub fn returning(target: impl IntoArg) -> Addition {
    Addition::Other(Arc::new(Returning(target.into_arg())))
}

/// `FOR UPDATE`.
pub fn for_update() -> Addition {
    Addition::Other(Arc::new(Ex::exactly("FOR UPDATE")))
}

/// `/* text */`, always last.
#[derive(Debug, Clone)]
pub struct Comment(String);

pub fn comment(text: impl Into<String>) -> Comment {
    Comment(text.into())
}

impl SqlExpr for Comment {
    fn is_nil(&self) -> bool {
        self.0.is_empty()
    }

    fn ex(&self, _: &Toggles) -> Ex {
        Ex::exactly(format!("/* {} */", self.0.replace("*/", "* /")))
    }
}
