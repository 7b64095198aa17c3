//! Entry points for generating and deleting modules.

use serde::Serialize;
use std::path::PathBuf;

use crate::codegen::context::GenerationContext;
use crate::codegen::fs_utils::WriteStatus;
use crate::codegen::helpers::HelperTable;
use crate::codegen::naming::{derive_names, validate_module_name, ModuleIdentity, Scope};
use crate::codegen::pipeline::{ArtifactOutcome, OutputLayout, RenderPipeline};
use crate::codegen::spec::ModuleSpec;
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::menu::{MenuRepository, MenuSyncReport, MenuSynchronizer, MenuTree};
use crate::plugins::PluginRegistry;
use crate::rollback::{resolve_identity, RemovalReport, RollbackEngine};
use crate::schema::{SchemaSource, TableDescriptor};

/// Result of one `generate` call
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub identity: ModuleIdentity,
    pub generated_paths: Vec<PathBuf>,
    pub files: Vec<ArtifactOutcome>,
    /// `None` for system modules
    pub menu: Option<MenuSyncReport>,
}

impl GenerationReport {
    /// Number of files created or rewritten
    pub fn changed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status != WriteStatus::Unchanged)
            .count()
    }
}

/// A table as offered for generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenTableSummary {
    pub table_name: String,
    pub table_comment: String,
    pub is_generated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    /// Case-insensitive substring of the table name or comment
    pub search: Option<String>,
    pub is_generated: Option<bool>,
}

impl TableFilter {
    fn matches(&self, table: &GenTableSummary) -> bool {
        let text_ok = self.search.as_deref().map_or(true, |needle| {
            let needle = needle.to_lowercase();
            table.table_name.to_lowercase().contains(&needle)
                || table.table_comment.to_lowercase().contains(&needle)
        });
        let generated_ok = self
            .is_generated
            .map_or(true, |wanted| wanted == table.is_generated);
        text_ok && generated_ok
    }
}

pub struct CodeGenerator<S: SchemaSource, M: MenuRepository> {
    config: GeneratorConfig,
    schema: S,
    menus: M,
    helpers: HelperTable,
}

impl<S: SchemaSource, M: MenuRepository> CodeGenerator<S, M> {
    pub fn new(config: GeneratorConfig, schema: S, menus: M) -> Self {
        Self {
            config,
            schema,
            menus,
            helpers: HelperTable::default(),
        }
    }

    pub fn with_helpers(mut self, helpers: HelperTable) -> Self {
        self.helpers = helpers;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn menus(&self) -> &M {
        &self.menus
    }

    pub fn menus_mut(&mut self) -> &mut M {
        &mut self.menus
    }

    /// Generate the module for `table_name`.
    ///
    /// Names are validated before the schema is read, so a bad name never
    /// leaves files behind. Plugin modules also get their menu nodes.
    pub fn generate(&mut self, table_name: &str, scope_hint: Option<&str>) -> Result<GenerationReport> {
        validate_module_name(table_name)?;
        let identity = derive_names(table_name, scope_hint)?;
        validate_module_name(&identity.module_name)?;

        if identity.scope == Scope::Plugin && self.config.output.web_root.is_none() {
            return Err(GeneratorError::MissingWebRoot {
                module: identity.module_name,
            });
        }

        let table = self.schema.get_table(table_name)?;
        tracing::debug!(
            "Introspected {} ({} columns)",
            table.table_name,
            table.columns.len()
        );

        let mut report = self.render(identity, &table)?;
        if report.identity.scope == Scope::Plugin {
            report.menu = MenuSynchronizer::new(&mut self.menus, &self.config.menu.directory)
                .sync(&report.identity)?;
        }

        tracing::info!(
            "Generated module '{}': {} file(s) changed",
            report.identity.module_name,
            report.changed_files()
        );
        Ok(report)
    }

    /// Generate a system module from a hand-written field list
    pub fn generate_from_spec(&mut self, spec: &ModuleSpec) -> Result<GenerationReport> {
        let identity = spec.identity()?;
        let table = spec.to_table()?;
        let report = self.render(identity, &table)?;

        tracing::info!(
            "Generated module '{}' from spec: {} file(s) changed",
            report.identity.module_name,
            report.changed_files()
        );
        Ok(report)
    }

    /// Remove the module generated for `table_name`
    pub fn delete_generated(&mut self, table_name: &str, scope_hint: Option<&str>) -> Result<RemovalReport> {
        RollbackEngine::new(&self.config, &mut self.menus).delete(table_name, scope_hint)
    }

    /// Tables in the catalog, marked with whether their module exists
    pub fn list_tables(&self, filter: &TableFilter) -> Result<Vec<GenTableSummary>> {
        let tables = self.schema.list_tables()?;
        Ok(tables
            .into_iter()
            .map(|t| {
                let is_generated = resolve_identity(&t.table_name, None)
                    .map(|identity| self.config.module_dir(&identity).is_dir())
                    .unwrap_or(false);
                GenTableSummary {
                    table_name: t.table_name,
                    table_comment: t.table_comment,
                    is_generated,
                }
            })
            .filter(|t| filter.matches(t))
            .collect())
    }

    /// Current menu forest
    pub fn menu_tree(&mut self) -> Result<MenuTree> {
        Ok(MenuTree::build(self.menus.list()?))
    }

    /// Plugin modules present in the plugin output root
    pub fn plugins(&self) -> Result<PluginRegistry> {
        PluginRegistry::discover(self.config.scope_root(Scope::Plugin))
    }

    fn render(&self, identity: ModuleIdentity, table: &TableDescriptor) -> Result<GenerationReport> {
        let layout = OutputLayout {
            module_dir: self.config.module_dir(&identity),
            web_dir: match identity.scope {
                Scope::Plugin => self.config.web_dir(&identity),
                Scope::System => None,
            },
        };
        let ctx = GenerationContext::build(identity, table)?;
        let files = RenderPipeline::new(&self.helpers).run(&ctx, &layout)?;

        Ok(GenerationReport {
            identity: ctx.identity,
            generated_paths: files.iter().map(|f| f.path.clone()).collect(),
            files,
            menu: None,
        })
    }
}
