//! The fixed list of generated artifacts and where each one is written.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::codegen::naming::{ModuleIdentity, Scope};

/// One generated file per kind, emitted in [`ArtifactKind::ORDERED`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Entity,
    QueryDto,
    CreateDto,
    UpdateDto,
    DeleteDto,
    Service,
    Controller,
    Module,
    WebPage,
    WebView,
}

impl ArtifactKind {
    /// Emission order; every artifact comes after the ones it imports
    pub const ORDERED: [ArtifactKind; 10] = [
        ArtifactKind::Entity,
        ArtifactKind::QueryDto,
        ArtifactKind::CreateDto,
        ArtifactKind::UpdateDto,
        ArtifactKind::DeleteDto,
        ArtifactKind::Service,
        ArtifactKind::Controller,
        ArtifactKind::Module,
        ArtifactKind::WebPage,
        ArtifactKind::WebView,
    ];

    /// Artifacts emitted for a module of `scope`, in order
    pub fn for_scope(scope: Scope) -> impl Iterator<Item = ArtifactKind> {
        Self::ORDERED
            .into_iter()
            .filter(move |kind| scope == Scope::Plugin || !kind.is_web())
    }

    pub fn role(&self) -> &'static str {
        match self {
            ArtifactKind::Entity => "entity",
            ArtifactKind::QueryDto => "query",
            ArtifactKind::CreateDto => "create",
            ArtifactKind::UpdateDto => "update",
            ArtifactKind::DeleteDto => "delete",
            ArtifactKind::Service => "service",
            ArtifactKind::Controller => "controller",
            ArtifactKind::Module => "module",
            ArtifactKind::WebPage => "page",
            ArtifactKind::WebView => "view",
        }
    }

    pub fn is_dto(&self) -> bool {
        matches!(
            self,
            ArtifactKind::QueryDto
                | ArtifactKind::CreateDto
                | ArtifactKind::UpdateDto
                | ArtifactKind::DeleteDto
        )
    }

    /// Front-end artifacts go under the web root instead of the backend tree
    pub fn is_web(&self) -> bool {
        matches!(self, ArtifactKind::WebPage | ArtifactKind::WebView)
    }

    /// Artifacts whose symbols this one imports
    pub fn dependencies(&self) -> &'static [ArtifactKind] {
        use ArtifactKind::*;
        match self {
            Entity | QueryDto | CreateDto | UpdateDto | DeleteDto => &[],
            Service => &[Entity, QueryDto, CreateDto, UpdateDto],
            Controller => &[Service, QueryDto, CreateDto, UpdateDto, DeleteDto],
            Module => &[Entity, Service, Controller],
            WebPage => &[Controller],
            WebView => &[WebPage],
        }
    }

    /// File name relative to the module directory
    pub fn file_name(&self, identity: &ModuleIdentity) -> String {
        let module = &identity.module_name;
        match self {
            ArtifactKind::WebView => "index.vue".to_string(),
            kind if kind.is_dto() => format!("dto/{}-{}.dto.ts", kind.role(), module),
            kind => format!("{}.{}.ts", module, kind.role()),
        }
    }

    /// Full output path given the backend module directory and the web module directory
    pub fn output_path(&self, identity: &ModuleIdentity, module_dir: &Path, web_dir: &Path) -> PathBuf {
        let base = if self.is_web() { web_dir } else { module_dir };
        base.join(self.file_name(identity))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dto() {
            write!(f, "{}-dto", self.role())
        } else {
            f.write_str(self.role())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::naming::derive_names;

    #[test]
    fn test_dependencies_precede_dependents() {
        for (position, kind) in ArtifactKind::ORDERED.iter().enumerate() {
            for dep in kind.dependencies() {
                let dep_position = ArtifactKind::ORDERED
                    .iter()
                    .position(|k| k == dep)
                    .unwrap();
                assert!(
                    dep_position < position,
                    "{} must be emitted before {}",
                    dep,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_system_scope_skips_web_artifacts() {
        let kinds: Vec<_> = ArtifactKind::for_scope(Scope::System).collect();
        assert_eq!(kinds.len(), 8);
        assert!(kinds.iter().all(|k| !k.is_web()));
        assert_eq!(ArtifactKind::for_scope(Scope::Plugin).count(), 10);
    }

    #[test]
    fn test_file_names() {
        let identity = derive_names("plugin_single_page", Some("single-page")).unwrap();
        assert_eq!(
            ArtifactKind::Entity.file_name(&identity),
            "single-page.entity.ts"
        );
        assert_eq!(
            ArtifactKind::CreateDto.file_name(&identity),
            "dto/create-single-page.dto.ts"
        );
        assert_eq!(
            ArtifactKind::WebPage.file_name(&identity),
            "single-page.page.ts"
        );
        assert_eq!(ArtifactKind::WebView.file_name(&identity), "index.vue");
    }

    #[test]
    fn test_output_path_routes_web_artifacts() {
        let identity = derive_names("plugin_single_page", Some("single-page")).unwrap();
        let backend = Path::new("src/plugins/single-page");
        let web = Path::new("web/single-page");

        assert_eq!(
            ArtifactKind::Module.output_path(&identity, backend, web),
            backend.join("single-page.module.ts")
        );
        assert_eq!(
            ArtifactKind::WebView.output_path(&identity, backend, web),
            web.join("index.vue")
        );
    }
}
