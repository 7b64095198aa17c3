//! Module definitions written by hand instead of read from the database.
//!
//! ```yaml
//! module_name: notice
//! entity_name: SysNotice
//! table_name: sys_notice
//! fields:
//!   - name: title
//!     type: string
//!     comment: Notice title
//!   - name: body
//!     type: text
//!     nullable: true
//! ```

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::codegen::naming::{api_prefix, validate_module_name, ModuleIdentity, Scope};
use crate::codegen::utils::{to_pascal_case, to_snake_case};
use crate::error::{GeneratorError, Result};
use crate::schema::{ColumnDescriptor, SemanticType, TableDescriptor};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

fn require_identifier(what: &str, value: &str) -> Result<()> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(())
    } else {
        Err(GeneratorError::Config(format!(
            "{} '{}' must be a letter or underscore followed by letters, digits or underscores",
            what, value
        )))
    }
}

/// One field of a hand-written module
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub nullable: bool,
}

/// Hand-written module definition, always generated in system scope
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleSpec {
    pub module_name: String,
    pub entity_name: String,
    /// Defaults to the snake_case entity name
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub comment: String,
    pub fields: Vec<FieldSpec>,
}

/// Representative database type for a semantic type, chosen so that it maps back to the same type
fn db_type_for(semantic: SemanticType) -> &'static str {
    match semantic {
        SemanticType::String => "varchar(255)",
        SemanticType::Number => "int",
        SemanticType::Boolean => "boolean",
        SemanticType::Date => "datetime",
        SemanticType::Json => "json",
        SemanticType::Text => "text",
    }
}

impl ModuleSpec {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| GeneratorError::Config(format!("Failed to parse module spec: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }

    pub fn table_name(&self) -> String {
        self.table_name
            .clone()
            .unwrap_or_else(|| to_snake_case(&self.entity_name))
    }

    /// System-scope identity taken verbatim from the spec
    pub fn identity(&self) -> Result<ModuleIdentity> {
        validate_module_name(&self.module_name)?;
        require_identifier("entity name", &self.entity_name)?;
        let entity_name = to_pascal_case(&self.entity_name);
        Ok(ModuleIdentity {
            scope: Scope::System,
            module_name: self.module_name.clone(),
            class_prefix: entity_name.clone(),
            entity_name,
            api_prefix: api_prefix(Scope::System, &self.module_name),
        })
    }

    /// Synthetic table with an auto-generated `id` key followed by the listed fields
    pub fn to_table(&self) -> Result<TableDescriptor> {
        let table_name = self.table_name();
        validate_module_name(&table_name)?;

        let mut columns = vec![ColumnDescriptor::new("id", "int")
            .primary_key()
            .auto_generated()
            .with_comment("Primary key")];

        for field in &self.fields {
            require_identifier("field name", &field.name)?;
            let semantic = SemanticType::from_name(&field.field_type).ok_or_else(|| {
                GeneratorError::Config(format!(
                    "field '{}' has unknown type '{}' (expected string, number, boolean, date, json or text)",
                    field.name, field.field_type
                ))
            })?;
            if field.name == "id" {
                return Err(GeneratorError::PrimaryKeyViolation {
                    table: table_name,
                    found: 2,
                });
            }

            let mut column = ColumnDescriptor::new(field.name.clone(), db_type_for(semantic))
                .with_comment(field.comment.clone());
            if semantic == SemanticType::String {
                column = column.with_length(255);
            }
            if field.nullable {
                column = column.nullable();
            }
            columns.push(column);
        }

        Ok(TableDescriptor::new(table_name, columns).with_comment(self.comment.clone()))
    }
}
