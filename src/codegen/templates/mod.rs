//! Artifact renderers.
//!
//! Each renderer is a pure function of the generation context and the helper
//! table. Output carries no timestamps or other run-dependent text, so the
//! same schema always renders to the same bytes.

mod controller;
mod dto;
mod entity;
mod module;
mod service;
mod web;

use thiserror::Error;

use crate::codegen::artifacts::ArtifactKind;
use crate::codegen::context::GenerationContext;
use crate::codegen::helpers::HelperTable;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("page descriptor serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RenderResult = std::result::Result<String, RenderError>;

/// Render one artifact to text
pub fn render(kind: ArtifactKind, ctx: &GenerationContext, helpers: &HelperTable) -> RenderResult {
    match kind {
        ArtifactKind::Entity => entity::render(ctx, helpers),
        ArtifactKind::QueryDto => dto::render_query(ctx, helpers),
        ArtifactKind::CreateDto => dto::render_create(ctx, helpers),
        ArtifactKind::UpdateDto => dto::render_update(ctx, helpers),
        ArtifactKind::DeleteDto => dto::render_delete(ctx),
        ArtifactKind::Service => service::render(ctx, helpers),
        ArtifactKind::Controller => controller::render(ctx),
        ArtifactKind::Module => module::render(ctx),
        ArtifactKind::WebPage => web::render_page(ctx),
        ArtifactKind::WebView => web::render_view(ctx),
    }
}

/// Class names shared by several templates
pub(crate) struct ClassNames {
    pub entity: String,
    pub query_dto: String,
    pub create_dto: String,
    pub update_dto: String,
    pub delete_dto: String,
    pub service: String,
    pub controller: String,
    pub module: String,
}

impl ClassNames {
    pub fn of(ctx: &GenerationContext) -> Self {
        let prefix = &ctx.identity.class_prefix;
        Self {
            entity: ctx.identity.entity_name.clone(),
            query_dto: format!("Query{}Dto", prefix),
            create_dto: format!("Create{}Dto", prefix),
            update_dto: format!("Update{}Dto", prefix),
            delete_dto: format!("Delete{}Dto", prefix),
            service: format!("{}Service", prefix),
            controller: format!("{}Controller", prefix),
            module: format!("{}Module", prefix),
        }
    }
}

/// Relative import path of an artifact from the module directory
pub(crate) fn import_path(kind: ArtifactKind, ctx: &GenerationContext) -> String {
    let file = kind.file_name(&ctx.identity);
    let stem = file.strip_suffix(".ts").unwrap_or(&file);
    format!("./{}", stem)
}
