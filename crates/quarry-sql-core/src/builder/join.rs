//! Join clauses. A statement holding a join renders every column
//! table-qualified.

use super::condition::Condition;
use super::expr::{expr_list, with_toggles, Arg, Ex, IntoArg, SqlExpr};
use super::toggles::{Toggle, Toggles};
use crate::schema::Column;

/// `<prefix> <target> [ON <condition> | USING (<cols>)]`.
#[derive(Debug, Clone)]
pub struct Join {
    prefix: &'static str,
    target: Arg,
    on: Condition,
    using: Vec<Column>,
}

fn join_with(prefix: &'static str, target: impl IntoArg) -> Join {
    Join {
        prefix,
        target: target.into_arg(),
        on: Condition::nil(),
        using: Vec::new(),
    }
}

pub fn join(target: impl IntoArg) -> Join {
    join_with("JOIN", target)
}

pub fn inner_join(target: impl IntoArg) -> Join {
    join_with("INNER JOIN", target)
}

pub fn left_join(target: impl IntoArg) -> Join {
    join_with("LEFT JOIN", target)
}

pub fn right_join(target: impl IntoArg) -> Join {
    join_with("RIGHT JOIN", target)
}

pub fn full_join(target: impl IntoArg) -> Join {
    join_with("FULL JOIN", target)
}

pub fn cross_join(target: impl IntoArg) -> Join {
    join_with("CROSS JOIN", target)
}

impl Join {
    #[must_use]
    pub fn on(mut self, condition: Condition) -> Self {
        self.on = condition;
        self
    }

    #[must_use]
    pub fn using(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.using = columns.into_iter().collect();
        self
    }
}

impl SqlExpr for Join {
    fn is_nil(&self) -> bool {
        self.target.is_nil()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::new(self.prefix, Vec::new());
        e.write_query_byte(' ');
        e.write_expr(self.target.clone());

        if !self.on.is_nil() {
            e.write_query(" ON ");
            e.write_expr(&self.on);
        } else if !self.using.is_empty() {
            let bare = Toggles::new().with(Toggle::MultiTable, false);
            e.write_query(" USING ");
            e.write_group(|e| {
                e.write_expr(expr_list(
                    self.using
                        .iter()
                        .map(|c| with_toggles(c.clone(), bare.clone())),
                ));
            });
        }

        e.resolve(toggles)
    }
}
