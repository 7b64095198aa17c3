//! Error type shared by every stage of generation and deletion.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Error type for generation, synchronization and rollback operations
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("table '{table}' does not exist in the connected schema")]
    SchemaNotFound { table: String },

    #[error("table '{table}' is not a system table; a plugin directory hint is required")]
    MissingScopeHint { table: String },

    #[error("module name '{name}' contains illegal characters (allowed: a-z A-Z 0-9 - _)")]
    InvalidModuleName { name: String },

    #[error("table '{table}' must have exactly one primary key column, found {found}")]
    PrimaryKeyViolation { table: String, found: usize },

    #[error("generation of module '{module}' failed at artifact '{artifact}': {reason}")]
    GenerationFailed {
        module: String,
        artifact: String,
        reason: String,
    },

    #[error("table '{table}' is protected and cannot be deleted")]
    ProtectedResource { table: String },

    #[error("no web root configured; plugin module '{module}' needs one for its front-end artifacts")]
    MissingWebRoot { module: String },

    #[error("menu node {id} not found")]
    MenuNotFound { id: i32 },

    #[error("invalid permission key: {0}")]
    InvalidPermissionKey(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeneratorError {
    /// True for errors caused by the caller's input rather than by the
    /// generator or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GeneratorError::SchemaNotFound { .. }
                | GeneratorError::MissingScopeHint { .. }
                | GeneratorError::InvalidModuleName { .. }
                | GeneratorError::PrimaryKeyViolation { .. }
                | GeneratorError::ProtectedResource { .. }
                | GeneratorError::InvalidPermissionKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(GeneratorError::SchemaNotFound { table: "t".into() }.is_client_error());
        assert!(GeneratorError::ProtectedResource { table: "sys_user".into() }.is_client_error());
        assert!(!GeneratorError::MissingWebRoot { module: "m".into() }.is_client_error());

        let failed = GeneratorError::GenerationFailed {
            module: "single-page".into(),
            artifact: "service".into(),
            reason: "disk full".into(),
        };
        assert!(!failed.is_client_error());
        assert!(failed.to_string().contains("service"));
        assert!(failed.to_string().contains("single-page"));
    }
}
