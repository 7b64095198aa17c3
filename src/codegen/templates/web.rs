//! Front-end page descriptor and view stub for plugin modules.

use serde::Serialize;
use std::fmt::Write;

use super::RenderResult;
use crate::codegen::artifacts::ArtifactKind;
use crate::codegen::context::GenerationContext;
use crate::menu::PermissionAction;
use crate::schema::SemanticType;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageDescriptor<'a> {
    title: String,
    api_prefix: &'a str,
    primary_key: &'a str,
    permissions: PagePermissions,
    columns: Vec<PageColumn<'a>>,
    form: Vec<FormField<'a>>,
    search: Vec<&'a str>,
}

#[derive(Serialize)]
struct PagePermissions {
    list: String,
    add: String,
    update: String,
    delete: String,
}

#[derive(Serialize)]
struct PageColumn<'a> {
    prop: &'a str,
    label: &'a str,
    #[serde(rename = "type")]
    kind: SemanticType,
}

#[derive(Serialize)]
struct FormField<'a> {
    prop: &'a str,
    label: &'a str,
    #[serde(rename = "type")]
    kind: SemanticType,
    required: bool,
}

fn descriptor(ctx: &GenerationContext) -> PageDescriptor<'_> {
    let permission = |action| ctx.permission_key(action).to_string();

    PageDescriptor {
        title: ctx.display_name(),
        api_prefix: &ctx.identity.api_prefix,
        primary_key: &ctx.primary().property_name,
        permissions: PagePermissions {
            list: permission(PermissionAction::List),
            add: permission(PermissionAction::Add),
            update: permission(PermissionAction::Update),
            delete: permission(PermissionAction::Delete),
        },
        columns: ctx
            .columns
            .iter()
            .map(|c| PageColumn {
                prop: &c.property_name,
                label: c.label(),
                kind: c.semantic_type,
            })
            .collect(),
        form: ctx
            .user_fields()
            .map(|c| FormField {
                prop: &c.property_name,
                label: c.label(),
                kind: c.semantic_type,
                required: !c.nullable,
            })
            .collect(),
        // Long text and JSON make poor search filters.
        search: ctx
            .user_fields()
            .filter(|c| !matches!(c.semantic_type, SemanticType::Text | SemanticType::Json))
            .map(|c| c.property_name.as_str())
            .collect(),
    }
}

pub(super) fn render_page(ctx: &GenerationContext) -> RenderResult {
    let json = serde_json::to_string_pretty(&descriptor(ctx))?;

    let mut out = String::new();
    writeln!(out, "const page = {} as const;", json)?;
    writeln!(out)?;
    writeln!(out, "export default page;")?;
    Ok(out)
}

pub(super) fn render_view(ctx: &GenerationContext) -> RenderResult {
    let page_file = ArtifactKind::WebPage.file_name(&ctx.identity);
    let page_import = page_file.strip_suffix(".ts").unwrap_or(&page_file);

    let mut out = String::new();
    writeln!(out, "<template>")?;
    writeln!(out, "  <div class=\"plugin-page\">")?;
    writeln!(out, "    <h2>{{{{ page.title }}}}</h2>")?;
    writeln!(out, "    <el-table :data=\"list\" v-loading=\"loading\">")?;
    writeln!(
        out,
        "      <el-table-column v-for=\"col in page.columns\" :key=\"col.prop\" :prop=\"col.prop\" :label=\"col.label\" />"
    )?;
    writeln!(out, "    </el-table>")?;
    writeln!(
        out,
        "    <el-pagination v-model:current-page=\"pageNum\" :total=\"total\" @current-change=\"load\" />"
    )?;
    writeln!(out, "  </div>")?;
    writeln!(out, "</template>")?;
    writeln!(out)?;
    writeln!(out, "<script setup lang=\"ts\">")?;
    writeln!(out, "import {{ onMounted, ref }} from 'vue';")?;
    writeln!(out, "import request from '@/utils/request';")?;
    writeln!(out, "import page from './{}';", page_import)?;
    writeln!(out)?;
    writeln!(out, "const list = ref([]);")?;
    writeln!(out, "const total = ref(0);")?;
    writeln!(out, "const pageNum = ref(1);")?;
    writeln!(out, "const loading = ref(false);")?;
    writeln!(out)?;
    writeln!(out, "async function load() {{")?;
    writeln!(out, "  loading.value = true;")?;
    writeln!(out, "  try {{")?;
    writeln!(
        out,
        "    const res = await request.get(`/${{page.apiPrefix}}`, {{ params: {{ page: pageNum.value }} }});"
    )?;
    writeln!(out, "    list.value = res.data.list;")?;
    writeln!(out, "    total.value = res.data.total;")?;
    writeln!(out, "  }} finally {{")?;
    writeln!(out, "    loading.value = false;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "onMounted(load);")?;
    writeln!(out, "</script>")?;
    Ok(out)
}
