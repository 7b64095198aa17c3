//! Query, create, update and delete parameter objects.

use std::collections::BTreeSet;
use std::fmt::Write;

use super::{ClassNames, RenderResult};
use crate::codegen::context::{ColumnContext, GenerationContext};
use crate::codegen::helpers::{DtoRole, HelperTable};
use crate::schema::SemanticType;

const TRANSFORMER_DECORATORS: &[&str] = &["Type", "Transform"];
const SWAGGER_DECORATORS: &[&str] = &["ApiProperty", "ApiPropertyOptional"];

/// `@IsOptional()` -> `IsOptional`
fn decorator_name(decorator: &str) -> &str {
    let body = decorator.trim_start_matches('@');
    body.split('(').next().unwrap_or(body)
}

/// Import lines for every decorator used, grouped by package
fn write_imports<'a>(out: &mut String, decorators: impl Iterator<Item = &'a str>) -> std::fmt::Result {
    let mut validator = BTreeSet::new();
    let mut transformer = BTreeSet::new();
    let mut swagger = BTreeSet::new();

    for name in decorators {
        if TRANSFORMER_DECORATORS.contains(&name) {
            transformer.insert(name);
        } else if SWAGGER_DECORATORS.contains(&name) {
            swagger.insert(name);
        } else {
            validator.insert(name);
        }
    }

    for (names, package) in [
        (validator, "class-validator"),
        (transformer, "class-transformer"),
        (swagger, "@nestjs/swagger"),
    ] {
        if !names.is_empty() {
            let names: Vec<_> = names.into_iter().collect();
            writeln!(out, "import {{ {} }} from '{}';", names.join(", "), package)?;
        }
    }
    Ok(())
}

fn render_fields(
    ctx: &GenerationContext,
    helpers: &HelperTable,
    role: DtoRole,
    class_name: &str,
) -> RenderResult {
    let fields: Vec<(&ColumnContext, Vec<String>)> = ctx
        .user_fields()
        .map(|column| (column, (helpers.validation_decorators)(column, role)))
        .collect();

    let mut out = String::new();
    write_imports(
        &mut out,
        fields
            .iter()
            .flat_map(|(_, decorators)| decorators.iter().map(|d| decorator_name(d))),
    )?;
    writeln!(out)?;
    writeln!(out, "export class {} {{", class_name)?;

    for (i, (column, decorators)) in fields.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        for decorator in decorators {
            writeln!(out, "    {}", decorator)?;
        }
        let optional = role != DtoRole::Create || column.nullable;
        writeln!(
            out,
            "    {}{}: {};",
            column.property_name,
            if optional { "?" } else { "" },
            column.property_type
        )?;
    }

    writeln!(out, "}}")?;
    Ok(out)
}

pub(super) fn render_query(ctx: &GenerationContext, helpers: &HelperTable) -> RenderResult {
    render_fields(ctx, helpers, DtoRole::Query, &ClassNames::of(ctx).query_dto)
}

pub(super) fn render_create(ctx: &GenerationContext, helpers: &HelperTable) -> RenderResult {
    render_fields(ctx, helpers, DtoRole::Create, &ClassNames::of(ctx).create_dto)
}

pub(super) fn render_update(ctx: &GenerationContext, helpers: &HelperTable) -> RenderResult {
    render_fields(ctx, helpers, DtoRole::Update, &ClassNames::of(ctx).update_dto)
}

/// Bulk delete body: `{ ids: [...] }` typed after the primary key
pub(super) fn render_delete(ctx: &GenerationContext) -> RenderResult {
    let primary = ctx.primary();
    let numeric = primary.semantic_type == SemanticType::Number;
    let (element_check, element_type) = if numeric {
        ("IsNumber", "Number")
    } else {
        ("IsString", "String")
    };

    let mut out = String::new();
    let mut validators = vec!["ArrayNotEmpty", "IsArray", element_check];
    validators.sort_unstable();
    writeln!(out, "import {{ {} }} from 'class-validator';", validators.join(", "))?;
    writeln!(out, "import {{ ApiProperty }} from '@nestjs/swagger';")?;
    writeln!(out)?;
    writeln!(out, "export class {} {{", ClassNames::of(ctx).delete_dto)?;
    writeln!(
        out,
        "    @ApiProperty({{ description: 'Ids to delete', type: [{}] }})",
        element_type
    )?;
    writeln!(out, "    @IsArray()")?;
    writeln!(out, "    @ArrayNotEmpty()")?;
    if numeric {
        writeln!(out, "    @IsNumber({{}}, {{ each: true }})")?;
    } else {
        writeln!(out, "    @IsString({{ each: true }})")?;
    }
    writeln!(out, "    ids: {}[];", primary.property_type)?;
    writeln!(out, "}}")?;
    Ok(out)
}
