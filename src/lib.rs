//! # Tablegen: schema-driven admin module generator
//!
//! Tablegen reads the structure of a relational table and emits a complete
//! CRUD module for a TypeScript admin backend: entity, parameter objects,
//! service, controller and module wiring. Plugin modules also get a
//! front-end page descriptor and view stub, plus the menu and permission
//! nodes that expose them.
//!
//! ## Features
//!
//! - **Live introspection**: table structure is read from the database
//!   catalog on every call (Diesel, `postgres` or `mysql` feature)
//! - **Deterministic output**: unchanged schemas regenerate byte-identical files
//! - **Menu synchronization**: idempotent upsert of directory, page and action nodes
//! - **Rollback**: removes generated directories and plugin menu nodes
//!
//! ## Example
//!
//! ```rust,no_run
//! use tablegen::{CodeGenerator, GeneratorConfig, InMemoryMenuRepository, InMemorySchema};
//! use tablegen::schema::{ColumnDescriptor, TableDescriptor};
//!
//! let schema = InMemorySchema::new().with_table(TableDescriptor::new(
//!     "plugin_single_page",
//!     vec![
//!         ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
//!         ColumnDescriptor::new("title", "varchar(255)"),
//!     ],
//! ));
//! let mut config = GeneratorConfig::default();
//! config.output.web_root = Some("web/src/views".into());
//!
//! let mut generator = CodeGenerator::new(config, schema, InMemoryMenuRepository::new());
//! let report = generator.generate("plugin_single_page", Some("single-page")).unwrap();
//! println!("{} files", report.generated_paths.len());
//! ```

pub mod codegen;
pub mod config;
pub mod diesel_runtime;
pub mod error;
pub mod generator;
pub mod menu;
pub mod plugins;
pub mod rollback;
pub mod schema;

pub use codegen::{derive_names, ArtifactKind, GenerationContext, ModuleIdentity, ModuleSpec, Scope};
pub use config::GeneratorConfig;
pub use diesel_runtime::{Database, DatabaseConfig};
pub use error::{GeneratorError, Result};
pub use generator::{CodeGenerator, GenTableSummary, GenerationReport, TableFilter};
pub use menu::{
    DieselMenuRepository, InMemoryMenuRepository, MenuNode, MenuRepository, MenuTree, PermissionKey,
};
pub use plugins::PluginRegistry;
pub use rollback::RemovalReport;
pub use schema::{map_type, DieselSchemaSource, InMemorySchema, SchemaSource, SemanticType};
