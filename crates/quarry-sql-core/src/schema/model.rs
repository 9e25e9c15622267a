//! Model descriptors.

use std::collections::BTreeMap;

use super::column::Column;

/// Index declarations: `name` or `name/METHOD` mapped to model field names.
pub type Indexes = BTreeMap<&'static str, Vec<&'static str>>;

/// Per-field metadata keyed by model field name.
pub type FieldMeta<T> = BTreeMap<&'static str, T>;

/// A type describing one table.
///
/// Implementations are usually generated. Only [`Model::table_name`] and
/// [`Model::columns`] are required; every other declaration defaults to
/// empty.
///
/// ```rust
/// use quarry_sql_core::schema::{Column, ColumnType, FieldKind, Indexes, Model, Table};
///
/// struct User;
///
/// impl Model for User {
///     fn table_name() -> &'static str {
///         "t_user"
///     }
///
///     fn columns() -> Vec<Column> {
///         vec![
///             Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
///             Column::new("f_name", ColumnType::new(FieldKind::String).size(64)).field("Name"),
///         ]
///     }
///
///     fn primary_key() -> Vec<&'static str> {
///         vec!["ID"]
///     }
///
///     fn unique_indexes() -> Indexes {
///         Indexes::from([("i_name", vec!["Name"])])
///     }
/// }
///
/// let table = Table::from_model::<User>();
/// assert_eq!(table.keys.len(), 2);
/// ```
pub trait Model: 'static {
    fn table_name() -> &'static str;

    fn columns() -> Vec<Column>;

    /// Field names of the primary key.
    fn primary_key() -> Vec<&'static str> {
        Vec::new()
    }

    fn indexes() -> Indexes {
        Indexes::new()
    }

    fn unique_indexes() -> Indexes {
        Indexes::new()
    }

    fn comments() -> FieldMeta<&'static str> {
        FieldMeta::new()
    }

    fn column_descriptions() -> FieldMeta<Vec<&'static str>> {
        FieldMeta::new()
    }

    /// Relation paths such as `["User", "ID"]`.
    fn column_relations() -> FieldMeta<Vec<&'static str>> {
        FieldMeta::new()
    }
}
