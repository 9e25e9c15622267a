//! Tables.

use std::any::TypeId;

use super::column::{Column, TableRef};
use super::columns::Columns;
use super::key::{Key, Keys};
use super::model::Model;
use crate::builder::{Arg, Ex, SqlExpr, Toggles};

/// Identity of the model a table was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelId {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ModelId {
    #[must_use]
    pub fn of<M: Model>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            type_name: std::any::type_name::<M>(),
        }
    }
}

/// A table: columns, keys and the model it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub schema: String,
    pub columns: Columns,
    pub keys: Keys,
    model: Option<ModelId>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: String::new(),
            columns: Columns::new(),
            keys: Keys::new(),
            model: None,
        }
    }

    /// Sets the schema and re-points every column at it.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        let table = self.table_ref();
        for column in self.columns.iter_mut() {
            column.attach(table.clone());
        }
        self
    }

    /// Builds the table declared by model `M`.
    ///
    /// Comments, descriptions and relations declared by the model are
    /// copied onto the matching columns; keys are built from the primary
    /// key and index declarations, where an index name of the form
    /// `name/METHOD` selects the index method.
    ///
    /// # Panics
    ///
    /// Panics when a key references a field the model does not declare, or
    /// when the model declares two auto-increment columns.
    #[must_use]
    pub fn from_model<M: Model>() -> Self {
        let mut table = Self::new(M::table_name());
        table.model = Some(ModelId::of::<M>());

        let comments = M::comments();
        let descriptions = M::column_descriptions();
        let relations = M::column_relations();

        for mut column in M::columns() {
            let field = column.field_name.as_str();
            if let Some(comment) = comments.get(field) {
                column.column_type.comment = (*comment).to_string();
            }
            if let Some(lines) = descriptions.get(field) {
                column.column_type.description = lines.iter().map(ToString::to_string).collect();
            }
            if let Some(path) = relations.get(field) {
                column.column_type.relation = path.iter().map(ToString::to_string).collect();
            }
            table.add_col(column);
        }

        let primary = M::primary_key();
        if !primary.is_empty() {
            table.add_key(Key::primary(primary));
        }
        for (unique, indexes) in [(false, M::indexes()), (true, M::unique_indexes())] {
            for (name_and_method, fields) in indexes {
                let (name, method) = name_and_method
                    .split_once('/')
                    .unwrap_or((name_and_method, ""));
                let key = if unique {
                    Key::unique_index(name)
                } else {
                    Key::index(name)
                };
                table.add_key(key.using(method.to_uppercase()).fields(fields));
            }
        }

        for key in &table.keys {
            for field in &key.def.field_names {
                let _ = table.must_f(field);
            }
        }

        table
    }

    /// The model this table was built from.
    #[must_use]
    pub const fn model(&self) -> Option<ModelId> {
        self.model
    }

    #[must_use]
    pub fn table_ref(&self) -> TableRef {
        TableRef {
            name: self.name.clone(),
            schema: self.schema.clone(),
        }
    }

    /// Adds `column`, pointing it at this table.
    pub fn add_col(&mut self, mut column: Column) {
        column.attach(self.table_ref());
        self.columns.add(column);
    }

    pub fn add_key(&mut self, key: Key) {
        self.keys.add(key);
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn col(&self, name: &str) -> Option<&Column> {
        self.columns.col(name)
    }

    /// Looks a column up by model field name.
    #[must_use]
    pub fn f(&self, field_name: &str) -> Option<&Column> {
        self.columns.f(field_name)
    }

    /// Looks a column up by model field name.
    ///
    /// # Panics
    ///
    /// Panics when the field is not declared.
    #[must_use]
    pub fn must_f(&self, field_name: &str) -> &Column {
        self.f(field_name).unwrap_or_else(|| {
            panic!(
                "field `{field_name}` is not declared on table `{}`",
                self.name
            )
        })
    }

    #[must_use]
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.keys.key(name)
    }

    /// Builds an expression where `#Field` stands for the column declared by
    /// model field `Field` and `?` for the next entry of `args`.
    ///
    /// # Panics
    ///
    /// Panics when a referenced field is not declared or when `args` has
    /// more entries than `template` has holders.
    #[must_use]
    pub fn expr(&self, template: &str, args: Vec<Arg>) -> Ex {
        let mut e = Ex::default();
        let mut args = args.into_iter();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '#' => {
                    let mut field = String::new();
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphanumeric() || next == '_' {
                            field.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if field.is_empty() {
                        e.write_query_byte('#');
                    } else {
                        e.write_expr(self.must_f(&field));
                    }
                }
                '?' => match args.next() {
                    Some(arg) => e.write_expr(arg),
                    None => e.write_query_byte('?'),
                },
                _ => e.write_query_byte(c),
            }
        }
        let extra = args.count();
        assert!(
            extra == 0,
            "{extra} arguments left without a `?` holder in `{template}`"
        );
        e
    }

    /// Every live (non-deprecated) column as a projection list.
    #[must_use]
    pub fn live_columns(&self) -> Columns {
        self.columns
            .iter()
            .filter(|c| !c.is_deprecated())
            .cloned()
            .collect()
    }
}

impl SqlExpr for Table {
    fn ex(&self, toggles: &Toggles) -> Ex {
        self.table_ref().ex(toggles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IntoArg, SqlValue};
    use crate::schema::{ColumnType, FieldKind};

    fn user() -> Table {
        let mut t = Table::new("t_user");
        t.add_col(
            Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement()).field("ID"),
        );
        t.add_col(Column::new("f_name", ColumnType::new(FieldKind::String)).field("Name"));
        t
    }

    #[test]
    fn test_render_with_schema() {
        let t = user();
        assert_eq!(t.ex(&Toggles::default()).query(), "t_user");
        let t = t.with_schema("app");
        assert_eq!(t.ex(&Toggles::default()).query(), "app.t_user");
        assert_eq!(t.must_f("Name").table().unwrap().schema, "app");
    }

    #[test]
    fn test_field_references() {
        let t = user();
        let (sql, values) = t
            .expr("#ID IN (?) AND #Name <> ?", vec![vec![1, 2, 3].into_arg(), "x".into_arg()])
            .build()
            .unwrap();
        assert_eq!(sql, "f_id IN (?,?,?) AND f_name <> ?");
        assert_eq!(values.len(), 4);
        assert_eq!(values[3], SqlValue::Text(String::from("x")));
    }

    #[test]
    fn test_lone_hash_is_text() {
        let t = user();
        assert_eq!(t.expr("# #Name", Vec::new()).build().unwrap().0, "# f_name");
    }

    #[test]
    #[should_panic(expected = "not declared")]
    fn test_unknown_field_panics() {
        let _ = user().expr("#Missing = 1", Vec::new());
    }
}
