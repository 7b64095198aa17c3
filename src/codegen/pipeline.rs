//! Render every artifact of a module and write it to disk in order.
//!
//! The first render or I/O failure stops the run. Files already written by
//! the same run stay on disk.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::codegen::artifacts::ArtifactKind;
use crate::codegen::context::GenerationContext;
use crate::codegen::fs_utils::{self, WriteStatus};
use crate::codegen::helpers::HelperTable;
use crate::codegen::templates;
use crate::error::{GeneratorError, Result};

/// One written (or already up to date) artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// Where a module's files go
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub module_dir: PathBuf,
    /// Required when the module has front-end artifacts
    pub web_dir: Option<PathBuf>,
}

impl OutputLayout {
    fn path_for(&self, kind: ArtifactKind, ctx: &GenerationContext) -> Result<PathBuf> {
        if !kind.is_web() {
            return Ok(self.module_dir.join(kind.file_name(&ctx.identity)));
        }
        let web_dir = self
            .web_dir
            .as_deref()
            .ok_or_else(|| GeneratorError::MissingWebRoot {
                module: ctx.module_name().to_string(),
            })?;
        Ok(kind.output_path(&ctx.identity, &self.module_dir, web_dir))
    }
}

pub struct RenderPipeline<'a> {
    helpers: &'a HelperTable,
}

impl<'a> RenderPipeline<'a> {
    pub fn new(helpers: &'a HelperTable) -> Self {
        Self { helpers }
    }

    /// Render and write all artifacts for the context's scope
    pub fn run(&self, ctx: &GenerationContext, layout: &OutputLayout) -> Result<Vec<ArtifactOutcome>> {
        let mut outcomes = Vec::new();

        for kind in ArtifactKind::for_scope(ctx.identity.scope) {
            let path = layout.path_for(kind, ctx)?;
            let failed = |reason: String| GeneratorError::GenerationFailed {
                module: ctx.module_name().to_string(),
                artifact: kind.to_string(),
                reason,
            };

            let contents = templates::render(kind, ctx, self.helpers).map_err(|e| failed(e.to_string()))?;
            let status = fs_utils::write_if_changed(&path, &contents)
                .map_err(|e| failed(format!("{}: {}", path.display(), e)))?;

            match status {
                WriteStatus::Unchanged => tracing::debug!("{} unchanged: {}", kind, path.display()),
                _ => tracing::info!("{:?} {}: {}", status, kind, path.display()),
            }

            outcomes.push(ArtifactOutcome { kind, path, status });
        }

        Ok(outcomes)
    }
}

/// Paths of all artifacts a module would produce, without rendering anything
pub fn planned_paths(ctx: &GenerationContext, module_dir: &Path, web_dir: Option<&Path>) -> Vec<PathBuf> {
    ArtifactKind::for_scope(ctx.identity.scope)
        .filter_map(|kind| match (kind.is_web(), web_dir) {
            (false, _) => Some(module_dir.join(kind.file_name(&ctx.identity))),
            (true, Some(web)) => Some(kind.output_path(&ctx.identity, module_dir, web)),
            (true, None) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::context::ColumnContext;
    use crate::codegen::helpers::DtoRole;
    use crate::codegen::templates::fixtures;

    #[test]
    fn test_run_writes_in_order_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout {
            module_dir: dir.path().join("plugins/single-page"),
            web_dir: Some(dir.path().join("web/single-page")),
        };
        let helpers = HelperTable::default();
        let ctx = fixtures::single_page();

        let first = RenderPipeline::new(&helpers).run(&ctx, &layout).unwrap();
        let kinds: Vec<_> = first.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, ArtifactKind::ORDERED.to_vec());
        assert!(first.iter().all(|o| o.status == WriteStatus::Created));
        assert!(dir.path().join("web/single-page/index.vue").exists());
        assert!(dir
            .path()
            .join("plugins/single-page/dto/delete-single-page.dto.ts")
            .exists());

        let second = RenderPipeline::new(&helpers).run(&ctx, &layout).unwrap();
        assert!(second.iter().all(|o| o.status == WriteStatus::Unchanged));

        let planned = planned_paths(&ctx, &layout.module_dir, layout.web_dir.as_deref());
        let written: Vec<_> = first.into_iter().map(|o| o.path).collect();
        assert_eq!(planned, written);
    }

    #[test]
    fn test_plugin_without_web_dir_fails_before_web_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout {
            module_dir: dir.path().join("plugins/single-page"),
            web_dir: None,
        };
        let helpers = HelperTable::default();

        let result = RenderPipeline::new(&helpers).run(&fixtures::single_page(), &layout);
        assert!(matches!(result, Err(GeneratorError::MissingWebRoot { .. })));
    }

    #[test]
    fn test_io_failure_names_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the module directory should be makes every write fail.
        let blocker = dir.path().join("notice");
        std::fs::write(&blocker, "").unwrap();

        let layout = OutputLayout {
            module_dir: blocker,
            web_dir: None,
        };
        let helpers = HelperTable::default();

        match RenderPipeline::new(&helpers).run(&fixtures::system_notice(), &layout) {
            Err(GeneratorError::GenerationFailed { module, artifact, .. }) => {
                assert_eq!(module, "notice");
                assert_eq!(artifact, "entity");
            }
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_helpers_reach_templates() {
        fn no_decorators(_: &ColumnContext, _: DtoRole) -> Vec<String> {
            Vec::new()
        }
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout {
            module_dir: dir.path().join("notice"),
            web_dir: None,
        };
        let helpers = HelperTable {
            validation_decorators: no_decorators,
            ..HelperTable::default()
        };

        RenderPipeline::new(&helpers)
            .run(&fixtures::system_notice(), &layout)
            .unwrap();
        let dto = std::fs::read_to_string(layout.module_dir.join("dto/create-notice.dto.ts")).unwrap();
        assert!(!dto.contains("@IsString"));
    }
}
