//! Context-sensitive SQL builder.
//!
//! Everything renders through [`SqlExpr::ex`] under a set of [`Toggles`]
//! inherited from the enclosing expression. Statements are ordinary
//! expressions and nest anywhere an expression is accepted.
//!
//! # Example
//!
//! ```rust
//! use quarry_sql_core::builder::{select_all, where_clause, SqlExpr, Toggles};
//! use quarry_sql_core::schema::{col, Table};
//!
//! let t = Table::new("t_user");
//! let (sql, params) = select_all()
//!     .from(&t, [where_clause(col("f_active").eq(true)).into()])
//!     .ex(&Toggles::default())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT * FROM t_user\nWHERE f_active = ?");
//! assert_eq!(params.len(), 1);
//! ```

mod addition;
mod assignment;
mod condition;
mod delete;
mod expr;
mod insert;
mod join;
mod select;
mod toggles;
mod update;
pub mod value;

pub use addition::{
    asc, comment, desc, except, for_update, group_by, intersect, limit, on_conflict, order,
    order_by, returning, union, union_all, where_clause, Addition, AdditionKind, Combination,
    Comment, GroupBy, Limit, OnConflict, Order, OrderBy, Where,
};
pub use assignment::{columns_and_select, columns_and_values, Assignment};
pub use condition::{and, or, xor, Condition, Conjunction};
pub use delete::{delete, StmtDelete};
pub use expr::{auto_alias, expr_list, with_toggles, Arg, Ex, IntoArg, SqlExpr, Toggled};
pub use insert::{insert, StmtInsert};
pub use join::{cross_join, full_join, inner_join, join, left_join, right_join, Join};
pub use select::{select, select_all, StmtSelect};
pub use toggles::{Toggle, Toggles};
pub use update::{update, StmtUpdate};
pub use value::{SqlValue, ToSqlValue, ValueExpr};
