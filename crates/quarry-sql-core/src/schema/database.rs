//! The table registry of one database.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::model::Model;
use super::table::Table;

#[derive(Debug, Default)]
struct Registry {
    tables: BTreeMap<String, Arc<Table>>,
    models: HashMap<TypeId, String>,
}

/// A named database and the tables registered on it.
///
/// Registration happens at startup; afterwards the registry is only read.
/// Each model's table is built once and shared.
#[derive(Debug)]
pub struct Database {
    pub name: String,
    pub schema: String,
    registry: RwLock<Registry>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: String::new(),
            registry: RwLock::new(Registry::default()),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Registers model `M`, building its table on first registration.
    pub fn register<M: Model>(&self) -> Arc<Table> {
        let type_id = TypeId::of::<M>();
        if let Some(table) = self.table_for::<M>() {
            return table;
        }

        let mut registry = self.registry.write();
        if let Some(name) = registry.models.get(&type_id) {
            if let Some(table) = registry.tables.get(name) {
                return Arc::clone(table);
            }
        }

        let table = Arc::new(Table::from_model::<M>().with_schema(self.schema.clone()));
        debug!(
            database = %self.name,
            table = %table.name,
            model = std::any::type_name::<M>(),
            columns = table.columns.len(),
            keys = table.keys.len(),
            "registered model"
        );
        registry.models.insert(type_id, table.name.clone());
        registry.tables.insert(table.name.clone(), Arc::clone(&table));
        table
    }

    /// Registers a table that has no model, replacing any table of the same
    /// name.
    pub fn add_table(&self, table: Table) -> Arc<Table> {
        let table = Arc::new(if self.schema.is_empty() || !table.schema.is_empty() {
            table
        } else {
            table.with_schema(self.schema.clone())
        });
        debug!(database = %self.name, table = %table.name, "registered table");
        self.registry
            .write()
            .tables
            .insert(table.name.clone(), Arc::clone(&table));
        table
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<Arc<Table>> {
        self.registry.read().tables.get(name).cloned()
    }

    /// The table registered for model `M`.
    #[must_use]
    pub fn table_for<M: Model>(&self) -> Option<Arc<Table>> {
        let registry = self.registry.read();
        let name = registry.models.get(&TypeId::of::<M>())?;
        registry.tables.get(name).cloned()
    }

    /// Every registered table, ordered by name.
    #[must_use]
    pub fn tables(&self) -> Vec<Arc<Table>> {
        self.registry.read().tables.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType, FieldKind};

    struct Org;

    impl Model for Org {
        fn table_name() -> &'static str {
            "t_org"
        }

        fn columns() -> Vec<Column> {
            vec![
                Column::new("f_id", ColumnType::new(FieldKind::Uint64).autoincrement())
                    .field("ID"),
            ]
        }

        fn primary_key() -> Vec<&'static str> {
            vec!["ID"]
        }
    }

    #[test]
    fn test_register_once() {
        let db = Database::new("app").with_schema("public");
        let first = db.register::<Org>();
        let second = db.register::<Org>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.schema, "public");
        assert!(db.table("t_org").is_some());
        assert!(Arc::ptr_eq(&db.table_for::<Org>().unwrap(), &first));
        assert_eq!(db.tables().len(), 1);
    }

    #[test]
    fn test_add_table_inherits_schema() {
        let db = Database::new("app").with_schema("public");
        let table = db.add_table(Table::new("t_log"));
        assert_eq!(table.schema, "public");
        assert!(db.table_for::<Org>().is_none());
    }
}
