//! Code generation for table-backed admin modules.
//!
//! A table snapshot plus its derived [`naming::ModuleIdentity`] becomes a
//! [`context::GenerationContext`], which the [`pipeline::RenderPipeline`]
//! renders into the fixed artifact list of [`artifacts::ArtifactKind`].

pub mod artifacts;
pub mod context;
pub mod fs_utils;
pub mod helpers;
pub mod naming;
pub mod pipeline;
pub mod spec;
pub mod templates;
pub mod utils;

pub use artifacts::ArtifactKind;
pub use context::{AuditRole, ColumnContext, GenerationContext};
pub use fs_utils::WriteStatus;
pub use helpers::{ColumnDefault, DtoRole, HelperTable};
pub use naming::{derive_names, validate_module_name, ModuleIdentity, Scope};
pub use pipeline::{ArtifactOutcome, OutputLayout, RenderPipeline};
pub use spec::{FieldSpec, ModuleSpec};
