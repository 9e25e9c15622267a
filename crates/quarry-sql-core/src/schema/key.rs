//! Keys and indexes.

use super::table::Table;
use crate::builder::{expr_list, Ex};

/// What an index covers: model fields, raw column names or an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDef {
    pub field_names: Vec<String>,
    pub col_names: Vec<String>,
    /// Expression template; `#Field` refers to a model field.
    pub expr: String,
}

impl IndexDef {
    /// Renders the indexed column list of `table`.
    ///
    /// # Panics
    ///
    /// Panics when a field is not declared on `table`.
    #[must_use]
    pub fn table_expr(&self, table: &Table) -> Ex {
        if !self.expr.is_empty() {
            return table.expr(&self.expr, Vec::new());
        }
        if !self.col_names.is_empty() {
            return Ex::exactly(self.col_names.join(", "));
        }
        expr_list(self.field_names.iter().map(|f| table.must_f(f)))
    }
}

/// A primary key, unique index or plain index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub is_unique: bool,
    /// Index method such as `BTREE`, `GIN` or `SPATIAL`. Empty uses the
    /// engine default.
    pub method: String,
    pub def: IndexDef,
}

impl Key {
    /// The primary key over `fields`.
    pub fn primary(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::unique_index("primary").fields(fields)
    }

    pub fn index(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            is_unique: false,
            method: String::new(),
            def: IndexDef::default(),
        }
    }

    pub fn unique_index(name: impl Into<String>) -> Self {
        Self {
            is_unique: true,
            ..Self::index(name)
        }
    }

    #[must_use]
    pub fn using(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Indexes model fields.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.def.field_names = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Indexes raw column names.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.def.col_names = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Indexes an expression.
    #[must_use]
    pub fn expr(mut self, template: impl Into<String>) -> Self {
        self.def.expr = template.into();
        self
    }

    /// Primary keys are unique and named `primary` or `*pkey`.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_unique && (self.name == "primary" || self.name.ends_with("pkey"))
    }
}

/// An ordered, name-unique set of keys. Names are stored lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys {
    list: Vec<Key>,
}

impl Keys {
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Adds `key`, replacing any key with the same name.
    pub fn add(&mut self, mut key: Key) {
        key.name = key.name.to_lowercase();
        match self.list.iter_mut().find(|k| k.name == key.name) {
            Some(slot) => *slot = key,
            None => self.list.push(key),
        }
    }

    #[must_use]
    pub fn key(&self, name: &str) -> Option<&Key> {
        let name = name.to_lowercase();
        self.list.iter().find(|k| k.name == name)
    }

    #[must_use]
    pub fn primary(&self) -> Option<&Key> {
        self.list.iter().find(|k| k.is_primary())
    }

    pub fn remove(&mut self, name: &str) -> Option<Key> {
        let name = name.to_lowercase();
        let index = self.list.iter().position(|k| k.name == name)?;
        Some(self.list.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.list.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<'a> IntoIterator for &'a Keys {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}
