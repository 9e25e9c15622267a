use super::column::Column;
use crate::builder::{Ex, SqlExpr, Toggles};

/// An ordered, name-unique collection of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    list: Vec<Column>,
}

impl Columns {
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Adds `column`, replacing any column with the same name in place.
    ///
    /// # Panics
    ///
    /// Panics when `column` is auto-increment and another auto-increment
    /// column is already present.
    pub fn add(&mut self, column: Column) {
        if column.column_type.auto_increment {
            if let Some(existing) = self.auto_increment() {
                assert!(
                    existing.name == column.name,
                    "`{}` cannot be auto-increment: `{}` already is",
                    column.name,
                    existing.name
                );
            }
        }
        match self.list.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None => self.list.push(column),
        }
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn col(&self, name: &str) -> Option<&Column> {
        self.list.iter().find(|c| c.name == name)
    }

    /// Looks a column up by model field name.
    #[must_use]
    pub fn f(&self, field_name: &str) -> Option<&Column> {
        self.list.iter().find(|c| c.field_name == field_name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let index = self.list.iter().position(|c| c.name == name)?;
        Some(self.list.remove(index))
    }

    #[must_use]
    pub fn auto_increment(&self) -> Option<&Column> {
        self.list.iter().find(|c| c.column_type.auto_increment)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
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

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Column> {
        self.list.iter_mut()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl FromIterator<Column> for Columns {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut columns = Self::new();
        for column in iter {
            columns.add(column);
        }
        columns
    }
}

impl SqlExpr for Columns {
    fn is_nil(&self) -> bool {
        self.list.is_empty()
    }

    fn ex(&self, toggles: &Toggles) -> Ex {
        let mut e = Ex::default();
        for (i, column) in self.list.iter().enumerate() {
            if i > 0 {
                e.write_query(", ");
            }
            e.write_expr(column);
        }
        e.resolve(toggles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{col, ColumnType, FieldKind};

    fn serial(name: &str) -> Column {
        Column::new(name, ColumnType::new(FieldKind::Uint64).autoincrement())
    }

    #[test]
    fn test_same_name_replaces_in_place() {
        let mut columns: Columns = [col("a"), col("b")].into_iter().collect();
        columns.add(Column::new("a", ColumnType::new(FieldKind::Int32)));
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(columns.col("a").unwrap().column_type.kind, FieldKind::Int32);
    }

    #[test]
    fn test_render_joined() {
        let columns: Columns = [col("a"), col("b")].into_iter().collect();
        assert_eq!(columns.ex(&Toggles::default()).query(), "a, b");
    }

    #[test]
    fn test_single_auto_increment() {
        let mut columns = Columns::new();
        columns.add(serial("f_id"));
        columns.add(serial("f_id"));
        assert_eq!(columns.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already is")]
    fn test_second_auto_increment_panics() {
        let mut columns = Columns::new();
        columns.add(serial("f_id"));
        columns.add(serial("f_other_id"));
    }
}
