//! Schema metadata model.
//!
//! Tables are built from [`Model`] descriptors (or by hand, or from
//! introspection) and registered on a [`Database`]. Columns keep a
//! reference to their table's name so they can be table-qualified when a
//! statement spans several tables.

mod column;
mod column_type;
mod columns;
mod database;
mod key;
mod model;
mod table;

pub use column::{col, Column, TableRef};
pub use column_type::{ColumnType, DeprecatedActs, FieldKind};
pub use columns::Columns;
pub use database::Database;
pub use key::{IndexDef, Key, Keys};
pub use model::{FieldMeta, Indexes, Model};
pub use table::{ModelId, Table};
