//! Render context assembled from an introspected table and its module identity.

use serde::Serialize;
use std::collections::HashSet;

use crate::codegen::naming::ModuleIdentity;
use crate::codegen::utils::to_camel_case;
use crate::error::Result;
use crate::menu::{PermissionAction, PermissionKey};
use crate::schema::{ColumnDescriptor, SemanticType, TableDescriptor};

/// Bookkeeping columns maintained by the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditRole {
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

impl AuditRole {
    /// Match on the normalized (camelCase, lowercased) property name
    fn detect(normalized: &str) -> Option<Self> {
        match normalized {
            "createdat" => Some(AuditRole::CreatedAt),
            "updatedat" => Some(AuditRole::UpdatedAt),
            "createdby" => Some(AuditRole::CreatedBy),
            "updatedby" => Some(AuditRole::UpdatedBy),
            _ => None,
        }
    }
}

/// A column plus the hints templates need to render it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnContext {
    /// Raw database identifier
    pub column_name: String,
    /// camelCase property name used in generated code
    pub property_name: String,
    pub semantic_type: SemanticType,
    pub property_type: &'static str,
    pub db_type: String,
    pub length: Option<u32>,
    pub nullable: bool,
    pub is_primary: bool,
    pub is_auto_generated: bool,
    pub default_value: Option<String>,
    pub comment: String,
    pub audit: Option<AuditRole>,
}

impl ColumnContext {
    fn from_descriptor(column: &ColumnDescriptor) -> Self {
        let property_name = to_camel_case(&column.name);
        let audit = AuditRole::detect(&property_name.to_lowercase());

        Self {
            column_name: column.name.clone(),
            property_type: column.semantic_type.property_type(),
            semantic_type: column.semantic_type,
            db_type: column.db_type.clone(),
            length: column.length,
            nullable: column.nullable,
            is_primary: column.is_primary,
            is_auto_generated: column.is_auto_generated,
            default_value: column.default_value.clone(),
            comment: column.comment.clone(),
            audit,
            property_name,
        }
    }

    /// Whether the column is writable through create/update/query objects
    pub fn is_user_field(&self) -> bool {
        !self.is_primary && self.audit.is_none()
    }

    /// Comment if present, property name otherwise
    pub fn label(&self) -> &str {
        if self.comment.is_empty() {
            &self.property_name
        } else {
            &self.comment
        }
    }
}

/// Everything a template may read; built once, passed by shared reference
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub identity: ModuleIdentity,
    pub table_name: String,
    pub table_comment: String,
    pub columns: Vec<ColumnContext>,
    pub has_timestamps: bool,
    pub has_user_stamps: bool,
}

impl GenerationContext {
    /// Combine a table snapshot with its derived identity.
    ///
    /// Fails when the table does not have exactly one primary key column.
    pub fn build(identity: ModuleIdentity, table: &TableDescriptor) -> Result<Self> {
        table.primary_column()?;

        let mut columns: Vec<ColumnContext> = table
            .columns
            .iter()
            .map(ColumnContext::from_descriptor)
            .collect();

        // Compare normalized property names, not raw snake_case identifiers.
        let normalized: HashSet<String> = columns
            .iter()
            .map(|c| c.property_name.to_lowercase())
            .collect();
        let has_timestamps = normalized.contains("createdat") && normalized.contains("updatedat");
        let has_user_stamps = normalized.contains("createdby") && normalized.contains("updatedby");

        // A lone half of a pair is an ordinary column.
        for column in &mut columns {
            column.audit = column.audit.filter(|role| match role {
                AuditRole::CreatedAt | AuditRole::UpdatedAt => has_timestamps,
                AuditRole::CreatedBy | AuditRole::UpdatedBy => has_user_stamps,
            });
        }

        Ok(Self {
            identity,
            table_name: table.table_name.clone(),
            table_comment: table.table_comment.clone(),
            columns,
            has_timestamps,
            has_user_stamps,
        })
    }

    pub fn module_name(&self) -> &str {
        &self.identity.module_name
    }

    pub fn primary(&self) -> &ColumnContext {
        // build() guarantees exactly one primary column
        self.columns
            .iter()
            .find(|c| c.is_primary)
            .unwrap_or(&self.columns[0])
    }

    /// Columns exposed through create/update/query objects
    pub fn user_fields(&self) -> impl Iterator<Item = &ColumnContext> {
        self.columns.iter().filter(|c| c.is_user_field())
    }

    pub fn permission_key(&self, action: PermissionAction) -> PermissionKey {
        PermissionKey::new(
            self.identity.scope,
            self.identity.module_name.clone(),
            action,
        )
    }

    /// Human readable name, e.g. `Single Page`
    pub fn display_name(&self) -> String {
        crate::menu::sync::display_name(&self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::naming::derive_names;

    fn table(columns: Vec<ColumnDescriptor>) -> TableDescriptor {
        TableDescriptor::new("plugin_single_page", columns)
    }

    fn identity() -> ModuleIdentity {
        derive_names("plugin_single_page", Some("single-page")).unwrap()
    }

    #[test]
    fn test_snake_case_timestamps_are_detected() {
        let ctx = GenerationContext::build(
            identity(),
            &table(vec![
                ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
                ColumnDescriptor::new("created_at", "datetime"),
                ColumnDescriptor::new("updated_at", "datetime"),
            ]),
        )
        .unwrap();
        assert!(ctx.has_timestamps);
        assert!(!ctx.has_user_stamps);
    }

    #[test]
    fn test_camel_case_user_stamps_are_detected() {
        let ctx = GenerationContext::build(
            identity(),
            &table(vec![
                ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
                ColumnDescriptor::new("createdBy", "int"),
                ColumnDescriptor::new("UPDATED_BY", "int"),
            ]),
        )
        .unwrap();
        assert!(ctx.has_user_stamps);
        assert!(!ctx.has_timestamps);
    }

    #[test]
    fn test_one_half_of_a_pair_is_not_enough() {
        let ctx = GenerationContext::build(
            identity(),
            &table(vec![
                ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
                ColumnDescriptor::new("created_at", "datetime"),
            ]),
        )
        .unwrap();
        assert!(!ctx.has_timestamps);

        let created_at = ctx.columns.iter().find(|c| c.column_name == "created_at").unwrap();
        assert_eq!(created_at.audit, None);
        assert!(created_at.is_user_field());
    }

    #[test]
    fn test_user_fields_skip_primary_and_audit_columns() {
        let ctx = GenerationContext::build(
            identity(),
            &table(vec![
                ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
                ColumnDescriptor::new("cover_image", "varchar(255)"),
                ColumnDescriptor::new("created_at", "datetime"),
                ColumnDescriptor::new("updated_at", "datetime"),
            ]),
        )
        .unwrap();
        let fields: Vec<_> = ctx.user_fields().map(|c| c.property_name.as_str()).collect();
        assert_eq!(fields, vec!["coverImage"]);
        assert_eq!(ctx.primary().property_name, "id");
    }

    #[test]
    fn test_build_requires_primary_key() {
        let result = GenerationContext::build(
            identity(),
            &table(vec![ColumnDescriptor::new("title", "varchar(20)")]),
        );
        assert!(result.is_err());
    }
}
