use std::fmt::Write;

use super::{import_path, ClassNames, RenderResult};
use crate::codegen::artifacts::ArtifactKind;
use crate::codegen::context::GenerationContext;
use crate::menu::PermissionAction;
use crate::schema::SemanticType;

pub(super) fn render(ctx: &GenerationContext) -> RenderResult {
    let names = ClassNames::of(ctx);
    let primary = ctx.primary();
    let numeric_id = primary.semantic_type == SemanticType::Number;
    let id_param = if numeric_id {
        format!("@Param('id', ParseIntPipe) id: {}", primary.property_type)
    } else {
        format!("@Param('id') id: {}", primary.property_type)
    };
    let permission = |action| ctx.permission_key(action).to_string();

    let mut common = vec![
        "Body", "Controller", "Delete", "Get", "HttpCode", "Param", "Patch", "Post", "Query",
        "UseGuards",
    ];
    if numeric_id {
        common.push("ParseIntPipe");
        common.sort_unstable();
    }

    let mut out = String::new();
    writeln!(out, "import {{ {} }} from '@nestjs/common';", common.join(", "))?;
    writeln!(out, "import {{ AuthGuard }} from '@nestjs/passport';")?;
    writeln!(out, "import {{ PermissionsGuard }} from '@/common/guards/permissions.guard';")?;
    writeln!(
        out,
        "import {{ RequirePermissions }} from '@/common/decorators/require-permissions.decorator';"
    )?;
    writeln!(out, "import {{ PaginationDto }} from '@/common/dto/pagination.dto';")?;
    for (class, kind) in [
        (&names.service, ArtifactKind::Service),
        (&names.query_dto, ArtifactKind::QueryDto),
        (&names.create_dto, ArtifactKind::CreateDto),
        (&names.update_dto, ArtifactKind::UpdateDto),
        (&names.delete_dto, ArtifactKind::DeleteDto),
    ] {
        writeln!(out, "import {{ {} }} from '{}';", class, import_path(kind, ctx))?;
    }
    writeln!(out)?;

    writeln!(out, "@Controller('{}')", ctx.identity.api_prefix)?;
    writeln!(out, "@UseGuards(AuthGuard('jwt'), PermissionsGuard)")?;
    writeln!(out, "export class {} {{", names.controller)?;
    writeln!(
        out,
        "    constructor(private readonly service: {}) {{}}",
        names.service
    )?;
    writeln!(out)?;

    writeln!(out, "    @Post()")?;
    writeln!(out, "    @RequirePermissions('{}')", permission(PermissionAction::Add))?;
    writeln!(out, "    create(@Body() createDto: {}) {{", names.create_dto)?;
    writeln!(out, "        return this.service.create(createDto);")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @Get()")?;
    writeln!(out, "    @RequirePermissions('{}')", permission(PermissionAction::List))?;
    writeln!(
        out,
        "    findAll(@Query() paginationDto: PaginationDto, @Query() queryDto: {}) {{",
        names.query_dto
    )?;
    writeln!(out, "        return this.service.findAll(paginationDto, queryDto);")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @Get(':id')")?;
    writeln!(out, "    @RequirePermissions('{}')", permission(PermissionAction::List))?;
    writeln!(out, "    findOne({}) {{", id_param)?;
    writeln!(out, "        return this.service.findOne(id);")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @Patch(':id')")?;
    writeln!(out, "    @RequirePermissions('{}')", permission(PermissionAction::Update))?;
    writeln!(
        out,
        "    update({}, @Body() updateDto: {}) {{",
        id_param, names.update_dto
    )?;
    writeln!(out, "        return this.service.update(id, updateDto);")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @Delete(':id')")?;
    writeln!(out, "    @HttpCode(204)")?;
    writeln!(out, "    @RequirePermissions('{}')", permission(PermissionAction::Delete))?;
    writeln!(out, "    remove({}) {{", id_param)?;
    writeln!(out, "        return this.service.remove(id);")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @Delete()")?;
    writeln!(out, "    @HttpCode(204)")?;
    writeln!(out, "    @RequirePermissions('{}')", permission(PermissionAction::Delete))?;
    writeln!(out, "    bulkRemove(@Body() deleteDto: {}) {{", names.delete_dto)?;
    writeln!(out, "        return this.service.bulkRemove(deleteDto.ids);")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    Ok(out)
}
