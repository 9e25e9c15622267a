//! Boolean condition algebra.
//!
//! Conditions compose with `AND`, `OR` and `XOR`. Every child of a composed
//! condition is wrapped in parentheses; nil children are dropped, a
//! composition of a single child is that child, and a composition with no
//! children is nil.

use std::sync::Arc;

use super::expr::{Ex, SqlExpr};
use super::toggles::Toggles;

/// The operator joining the children of a composed condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
    Xor,
}

impl Conjunction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }
}

#[derive(Debug)]
enum Node {
    Leaf(Arc<dyn SqlExpr>),
    Composed {
        conjunction: Conjunction,
        children: Vec<Condition>,
    },
}

/// A boolean condition. The default value is nil.
#[derive(Debug, Clone, Default)]
pub struct Condition(Option<Arc<Node>>);

impl Condition {
    /// The nil condition: no constraint.
    #[must_use]
    pub const fn nil() -> Self {
        Self(None)
    }

    /// Wraps an expression as a condition. Nil expressions give nil.
    pub fn new(expr: impl SqlExpr + 'static) -> Self {
        if expr.is_nil() {
            return Self::nil();
        }
        Self(Some(Arc::new(Node::Leaf(Arc::new(expr)))))
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        and([self, other])
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        or([self, other])
    }

    /// `self XOR other`.
    #[must_use]
    pub fn xor(self, other: Self) -> Self {
        xor([self, other])
    }

    /// Reports whether both handles point at the same condition node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Joins the non-nil conditions with `AND`.
pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    compose(Conjunction::And, conditions)
}

/// Joins the non-nil conditions with `OR`.
pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    compose(Conjunction::Or, conditions)
}

/// Joins the non-nil conditions with `XOR`.
pub fn xor(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    compose(Conjunction::Xor, conditions)
}

fn compose(conjunction: Conjunction, conditions: impl IntoIterator<Item = Condition>) -> Condition {
    let mut children: Vec<Condition> = conditions.into_iter().filter(|c| !c.is_nil()).collect();
    match children.len() {
        0 => Condition::nil(),
        1 => children.remove(0),
        _ => Condition(Some(Arc::new(Node::Composed {
            conjunction,
            children,
        }))),
    }
}

impl SqlExpr for Condition {
    fn is_nil(&self) -> bool {
        match self.0.as_deref() {
            None => true,
            Some(Node::Leaf(expr)) => expr.is_nil(),
            Some(Node::Composed { children, .. }) => children.iter().all(SqlExpr::is_nil),
        }
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        match self.0.as_deref() {
            None => Ex::exactly(""),
            Some(Node::Leaf(expr)) => expr.ex(toggles),
            Some(Node::Composed {
                conjunction,
                children,
            }) => {
                let mut e = Ex::default();
                let mut written = 0;
                for child in children.iter().filter(|c| !c.is_nil()) {
                    if written > 0 {
                        e.write_query_byte(' ');
                        e.write_query(conjunction.as_sql());
                        e.write_query_byte(' ');
                    }
                    e.write_group(|e| e.write_expr(child));
                    written += 1;
                }
                e.resolve(toggles)
            }
        }
    }
}

impl From<Ex> for Condition {
    fn from(ex: Ex) -> Self {
        Self::new(ex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SqlValue;
    use crate::expr;
    use crate::schema::col;

    #[test]
    fn test_nil_is_identity() {
        let c = col("a").eq(1);
        let composed = and([c.clone(), Condition::nil()]);
        assert!(composed.ptr_eq(&c));
        assert_eq!(composed.ex(&Toggles::default()).query(), "a = ?");
    }

    #[test]
    fn test_all_nil_is_nil() {
        let c = or([Condition::nil(), Condition::new(Ex::default())]);
        assert!(c.is_nil());
        assert_eq!(c.ex(&Toggles::default()).query(), "");
    }

    #[test]
    fn test_failed_leaf_keeps_error() {
        let failed = Condition::new(Ex::failed(crate::error::BuildError::MissingValues));
        assert!(!failed.is_nil());
        let c = col("a").eq(1).and(failed);
        assert_eq!(
            c.ex(&Toggles::default()).build(),
            Err(crate::error::BuildError::MissingValues)
        );
    }

    #[test]
    fn test_nested_composition() {
        let a = col("a");
        let b = col("b");
        let c = a.eq(1).and(b.like("x")).or(a.eq(2));
        let (sql, values) = c.ex(&Toggles::default()).build().unwrap();
        assert_eq!(sql, "((a = ?) AND (b LIKE ?)) OR (a = ?)");
        assert_eq!(
            values,
            vec![
                SqlValue::Int(1),
                SqlValue::Text(String::from("%x%")),
                SqlValue::Int(2),
            ]
        );
    }

    #[test]
    fn test_xor() {
        let c = xor([col("a").is_null(), col("b").is_not_null()]);
        assert_eq!(
            c.ex(&Toggles::default()).query(),
            "(a IS NULL) XOR (b IS NOT NULL)"
        );
    }

    #[test]
    fn test_condition_from_expr() {
        let c: Condition = expr!("f_age > ?", 18).into();
        let c = c.and(Condition::from(expr!("")));
        assert_eq!(c.ex(&Toggles::default()).query(), "f_age > ?");
    }
}
