use std::collections::BTreeSet;
use std::fmt::Write;

use super::{ClassNames, RenderResult};
use crate::codegen::context::{AuditRole, ColumnContext, GenerationContext};
use crate::codegen::helpers::HelperTable;
use crate::codegen::utils::escape_single_quoted;

fn decorator(column: &ColumnContext) -> &'static str {
    match (column.is_primary, column.is_auto_generated, column.audit) {
        (true, true, _) => "PrimaryGeneratedColumn",
        (true, false, _) => "PrimaryColumn",
        (false, _, Some(AuditRole::CreatedAt)) => "CreateDateColumn",
        (false, _, Some(AuditRole::UpdatedAt)) => "UpdateDateColumn",
        _ => "Column",
    }
}

pub(super) fn render(ctx: &GenerationContext, helpers: &HelperTable) -> RenderResult {
    let names = ClassNames::of(ctx);
    let mut out = String::new();

    let imports: BTreeSet<&str> = std::iter::once("Entity")
        .chain(ctx.columns.iter().map(decorator))
        .collect();
    writeln!(
        out,
        "import {{ {} }} from 'typeorm';",
        imports.into_iter().collect::<Vec<_>>().join(", ")
    )?;
    writeln!(out)?;

    if ctx.table_comment.is_empty() {
        writeln!(out, "@Entity('{}')", ctx.table_name)?;
    } else {
        writeln!(
            out,
            "@Entity({{ name: '{}', comment: '{}' }})",
            ctx.table_name,
            escape_single_quoted(&ctx.table_comment)
        )?;
    }
    writeln!(out, "export class {} {{", names.entity)?;

    for (i, column) in ctx.columns.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "    @{}({})",
            decorator(column),
            (helpers.column_options)(column)
        )?;
        let optional = if column.nullable { " | null" } else { "" };
        writeln!(
            out,
            "    {}: {}{};",
            column.property_name, column.property_type, optional
        )?;
    }

    writeln!(out, "}}")?;
    Ok(out)
}
