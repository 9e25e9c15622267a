//! JSON schema files.
//!
//! A schema file describes a database as a list of tables, each with its
//! columns and keys. Column flags use the same grammar as
//! [`ColumnType::with_flags`]:
//!
//! ```json
//! {
//!   "name": "app",
//!   "tables": [{
//!     "name": "t_user",
//!     "columns": [
//!       { "name": "f_id", "field": "ID", "kind": "uint64", "flags": "autoincrement" },
//!       { "name": "f_name", "field": "Name", "kind": "string", "flags": "size=64,default=''" }
//!     ],
//!     "keys": [
//!       { "name": "primary", "fields": ["ID"] },
//!       { "name": "i_name", "unique": true, "fields": ["Name"] }
//!     ]
//!   }]
//! }
//! ```

use std::path::Path;

use quarry_sql_core::schema::{Column, ColumnType, Database, FieldKind, Key, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MigrateError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema: String,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub keys: Vec<KeySpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    /// Model field name; defaults to the column name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flags: String,
    /// Native type overriding the kind mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// A key. The name `primary` declares the primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeySpec {
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expr: String,
}

impl SchemaFile {
    /// Reads and parses the schema file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Io`] when the file cannot be read and
    /// [`MigrateError::Parse`] when it is not a valid schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let file = serde_json::from_str(&text).map_err(|source| MigrateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded schema file");
        Ok(file)
    }

    /// Parses a schema file from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Serialization`] when `text` is not a valid
    /// schema file.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds every declared table.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown kinds, malformed flags and keys over
    /// undeclared fields.
    pub fn to_tables(&self) -> Result<Vec<Table>> {
        self.tables.iter().map(TableSpec::to_table).collect()
    }

    /// Builds a database registering every declared table.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaFile::to_tables`].
    pub fn to_database(&self) -> Result<Database> {
        let database = Database::new(self.name.clone()).with_schema(self.schema.clone());
        for table in self.to_tables()? {
            let _ = database.add_table(table);
        }
        Ok(database)
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl TableSpec {
    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown kinds, malformed flags, a second
    /// auto-increment column, renames to undeclared columns and keys over
    /// undeclared fields.
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new(self.name.clone());
        for spec in &self.columns {
            let column = spec.to_column().map_err(|source| MigrateError::Column {
                table: self.name.clone(),
                column: spec.name.clone(),
                source,
            })?;
            if column.column_type.auto_increment {
                if let Some(existing) = table.columns.auto_increment() {
                    if existing.name != column.name {
                        return Err(MigrateError::DuplicateAutoIncrement {
                            table: self.name.clone(),
                            column: column.name,
                            existing: existing.name.clone(),
                        });
                    }
                }
            }
            table.add_col(column);
        }

        for column in &table.columns {
            let target = column
                .column_type
                .deprecated
                .as_ref()
                .and_then(|acts| acts.rename_to.as_deref());
            if let Some(target) = target {
                if table.col(target).is_none() {
                    return Err(MigrateError::UnknownRenameTarget {
                        table: self.name.clone(),
                        column: column.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        for spec in &self.keys {
            let unknown = spec
                .fields
                .iter()
                .cloned()
                .chain(expr_fields(&spec.expr))
                .find(|f| table.f(f).is_none());
            if let Some(field) = unknown {
                return Err(MigrateError::UnknownField {
                    table: self.name.clone(),
                    key: spec.name.clone(),
                    field,
                });
            }
            table.add_key(spec.to_key());
        }
        Ok(table)
    }
}

/// Field names referenced as `#Field` in a key expression.
fn expr_fields(expr: &str) -> Vec<String> {
    expr.split('#')
        .skip(1)
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|field| !field.is_empty())
        .collect()
}

impl ColumnSpec {
    fn to_column(&self) -> std::result::Result<Column, quarry_sql_core::SchemaError> {
        let kind: FieldKind = self.kind.parse()?;
        let mut column_type = ColumnType::new(kind).with_flags(&self.flags)?;
        if let Some(data_type) = &self.data_type {
            column_type = column_type.data_type(data_type.clone());
        }
        if !self.comment.is_empty() {
            column_type = column_type.comment(self.comment.clone());
        }
        let field = self.field.clone().unwrap_or_else(|| self.name.clone());
        Ok(Column::new(self.name.clone(), column_type).field(field))
    }
}

impl KeySpec {
    fn to_key(&self) -> Key {
        let mut key = if self.name.eq_ignore_ascii_case("primary") {
            Key::primary(self.fields.clone())
        } else if self.unique {
            Key::unique_index(self.name.clone()).fields(self.fields.clone())
        } else {
            Key::index(self.name.clone()).fields(self.fields.clone())
        };
        if !self.method.is_empty() {
            key = key.using(self.method.clone());
        }
        if !self.columns.is_empty() {
            key = key.columns(self.columns.clone());
        }
        if !self.expr.is_empty() {
            key = key.expr(self.expr.clone());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = r#"{
        "name": "app",
        "schema": "public",
        "tables": [{
            "name": "t_user",
            "columns": [
                { "name": "f_id", "field": "ID", "kind": "uint64", "flags": "autoincrement" },
                { "name": "f_name", "kind": "string", "flags": "size=64,default=''", "comment": "display name" },
                { "name": "f_geo", "kind": "bytes", "flags": "null", "data_type": "geometry" }
            ],
            "keys": [
                { "name": "primary", "fields": ["ID"] },
                { "name": "I_Name", "unique": true, "fields": ["f_name"] },
                { "name": "i_geo", "method": "spatial", "columns": ["f_geo"] }
            ]
        }]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let file = SchemaFile::parse(USERS).unwrap();
        let tables = file.to_tables().unwrap();
        assert_eq!(tables.len(), 1);

        let t = &tables[0];
        assert_eq!(t.columns.len(), 3);
        assert!(t.must_f("ID").column_type.auto_increment);
        let name = t.col("f_name").unwrap();
        assert_eq!(name.field_name, "f_name");
        assert_eq!(name.column_type.length, 64);
        assert_eq!(name.column_type.default.as_deref(), Some("''"));
        assert_eq!(name.column_type.comment, "display name");
        assert_eq!(t.col("f_geo").unwrap().column_type.data_type.as_deref(), Some("geometry"));

        assert!(t.keys.primary().is_some());
        assert!(t.key("i_name").unwrap().is_unique);
        assert_eq!(t.key("i_geo").unwrap().method, "spatial");
    }

    #[test]
    fn test_database_inherits_schema() {
        let db = SchemaFile::parse(USERS).unwrap().to_database().unwrap();
        assert_eq!(db.table("t_user").unwrap().schema, "public");
    }

    #[test]
    fn test_unknown_kind() {
        let file = SchemaFile::parse(
            r#"{"name": "app", "tables": [{"name": "t", "columns": [{"name": "f", "kind": "money"}]}]}"#,
        )
        .unwrap();
        let err = file.to_tables().unwrap_err();
        assert!(matches!(err, MigrateError::Column { ref column, .. } if column == "f"));
    }

    #[test]
    fn test_key_over_undeclared_field() {
        let file = SchemaFile::parse(
            r#"{"name": "app", "tables": [{"name": "t", "keys": [{"name": "primary", "fields": ["ID"]}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            file.to_tables().unwrap_err(),
            MigrateError::UnknownField { ref field, .. } if field == "ID"
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(SchemaFile::parse(r#"{"name": "app", "tabels": []}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SchemaFile::load("/nonexistent/schema.json").unwrap_err();
        assert!(matches!(err, MigrateError::Io(_)));
    }
}
