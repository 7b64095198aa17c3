//! Table structure as seen by the generator.
//!
//! A [`SchemaSource`] answers "what does table X look like right now". The
//! live implementation ([`introspect::DieselSchemaSource`]) queries the
//! database catalog on every call; [`InMemorySchema`] serves fixed
//! descriptors for tests and offline generation.

pub mod introspect;
pub mod type_map;

use crate::error::{GeneratorError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use introspect::DieselSchemaSource;
pub use type_map::{map_type, SemanticType};

/// Metadata of a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Raw database identifier (usually snake_case)
    pub name: String,
    pub semantic_type: SemanticType,
    /// Raw database type, e.g. `varchar(255)` or `tinyint(1)`
    pub db_type: String,
    pub length: Option<u32>,
    pub nullable: bool,
    pub is_primary: bool,
    pub is_auto_generated: bool,
    pub default_value: Option<String>,
    pub comment: String,
}

impl ColumnDescriptor {
    /// Build a column whose semantic type is derived from `db_type`
    pub fn new(name: impl Into<String>, db_type: impl Into<String>) -> Self {
        let db_type = db_type.into();
        Self {
            name: name.into(),
            semantic_type: map_type(&db_type),
            db_type,
            length: None,
            nullable: false,
            is_primary: false,
            is_auto_generated: false,
            default_value: None,
            comment: String::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Value assigned by the database (identity, serial, auto_increment)
    pub fn auto_generated(mut self) -> Self {
        self.is_auto_generated = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Immutable snapshot of one table's structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub table_comment: String,
}

impl TableDescriptor {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            table_comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.table_comment = comment.into();
        self
    }

    /// The single primary key column; any other count is an error
    pub fn primary_column(&self) -> Result<&ColumnDescriptor> {
        let mut primaries = self.columns.iter().filter(|c| c.is_primary);
        match (primaries.next(), primaries.next()) {
            (Some(column), None) => Ok(column),
            _ => Err(GeneratorError::PrimaryKeyViolation {
                table: self.table_name.clone(),
                found: self.columns.iter().filter(|c| c.is_primary).count(),
            }),
        }
    }
}

/// Name and comment of a table in the connected catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table_name: String,
    pub table_comment: String,
}

/// Read access to relational table structure
pub trait SchemaSource {
    /// Fetch the current structure of `table_name`.
    ///
    /// Fails with [`GeneratorError::SchemaNotFound`] when the table is absent.
    fn get_table(&self, table_name: &str) -> Result<TableDescriptor>;

    /// All base tables in the catalog, ordered by name
    fn list_tables(&self) -> Result<Vec<TableSummary>>;
}

/// Schema source backed by a fixed set of descriptors
#[derive(Debug, Clone, Default)]
pub struct InMemorySchema {
    tables: IndexMap<String, TableDescriptor>,
}

impl InMemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableDescriptor) -> Self {
        self.insert(table);
        self
    }

    pub fn insert(&mut self, table: TableDescriptor) {
        self.tables.insert(table.table_name.clone(), table);
    }
}

impl SchemaSource for InMemorySchema {
    fn get_table(&self, table_name: &str) -> Result<TableDescriptor> {
        self.tables
            .get(table_name)
            .cloned()
            .ok_or_else(|| GeneratorError::SchemaNotFound {
                table: table_name.to_string(),
            })
    }

    fn list_tables(&self) -> Result<Vec<TableSummary>> {
        let mut summaries: Vec<_> = self
            .tables
            .values()
            .map(|t| TableSummary {
                table_name: t.table_name.clone(),
                table_comment: t.table_comment.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.table_name.cmp(&b.table_name));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableDescriptor {
        TableDescriptor::new(
            "plugin_note",
            vec![
                ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
                ColumnDescriptor::new("body", "text").with_comment("Body"),
            ],
        )
    }

    #[test]
    fn test_column_semantic_type_is_derived() {
        let column = ColumnDescriptor::new("is_active", "boolean");
        assert_eq!(column.semantic_type, SemanticType::Boolean);
    }

    #[test]
    fn test_primary_column_exactly_one() {
        let table = sample();
        assert_eq!(table.primary_column().unwrap().name, "id");

        let mut none = sample();
        none.columns[0].is_primary = false;
        assert!(matches!(
            none.primary_column(),
            Err(GeneratorError::PrimaryKeyViolation { found: 0, .. })
        ));

        let mut two = sample();
        two.columns[1].is_primary = true;
        assert!(matches!(
            two.primary_column(),
            Err(GeneratorError::PrimaryKeyViolation { found: 2, .. })
        ));
    }

    #[test]
    fn test_in_memory_schema_lookup() {
        let schema = InMemorySchema::new().with_table(sample());
        assert!(schema.get_table("plugin_note").is_ok());
        assert!(matches!(
            schema.get_table("missing"),
            Err(GeneratorError::SchemaNotFound { .. })
        ));
        assert_eq!(schema.list_tables().unwrap().len(), 1);
    }
}
