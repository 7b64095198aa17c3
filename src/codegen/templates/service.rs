use std::fmt::Write;

use super::{import_path, ClassNames, RenderResult};
use crate::codegen::artifacts::ArtifactKind;
use crate::codegen::context::GenerationContext;
use crate::codegen::helpers::HelperTable;

pub(super) fn render(ctx: &GenerationContext, helpers: &HelperTable) -> RenderResult {
    let names = ClassNames::of(ctx);
    let primary = ctx.primary();
    let pk = &primary.property_name;
    let pk_type = primary.property_type;
    let repo = format!("{}Repository", (helpers.identifier)(&names.entity));
    let sortable: Vec<String> = ctx
        .columns
        .iter()
        .filter(|c| !c.is_primary)
        .map(|c| format!("'{}'", c.property_name))
        .collect();

    let mut out = String::new();
    writeln!(out, "import {{ Injectable, NotFoundException }} from '@nestjs/common';")?;
    writeln!(out, "import {{ InjectRepository }} from '@nestjs/typeorm';")?;
    writeln!(out, "import {{ In, Repository }} from 'typeorm';")?;
    writeln!(out, "import {{ BaseService }} from '@/common/services/base.service';")?;
    writeln!(out, "import {{ PaginationDto }} from '@/common/dto/pagination.dto';")?;
    for (class, kind) in [
        (&names.entity, ArtifactKind::Entity),
        (&names.query_dto, ArtifactKind::QueryDto),
        (&names.create_dto, ArtifactKind::CreateDto),
        (&names.update_dto, ArtifactKind::UpdateDto),
    ] {
        writeln!(out, "import {{ {} }} from '{}';", class, import_path(kind, ctx))?;
    }
    writeln!(out)?;

    writeln!(out, "@Injectable()")?;
    writeln!(
        out,
        "export class {} extends BaseService<{}> {{",
        names.service, names.entity
    )?;
    writeln!(
        out,
        "    private readonly safeSortByFields = [{}];",
        sortable.join(", ")
    )?;
    writeln!(out)?;
    writeln!(out, "    constructor(")?;
    writeln!(out, "        @InjectRepository({})", names.entity)?;
    writeln!(
        out,
        "        private readonly {}: Repository<{}>,",
        repo, names.entity
    )?;
    writeln!(out, "    ) {{")?;
    writeln!(out, "        super({});", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(
        out,
        "    async create(createDto: {}): Promise<{}> {{",
        names.create_dto, names.entity
    )?;
    writeln!(out, "        const entity = this.{}.create(createDto);", repo)?;
    writeln!(out, "        return this.{}.save(entity);", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(
        out,
        "    async findAll(paginationDto: PaginationDto, queryDto: {}): Promise<{{ list: {}[]; total: number }}> {{",
        names.query_dto, names.entity
    )?;
    writeln!(
        out,
        "        return this.paginate(paginationDto, queryDto, {{}}, this.safeSortByFields);"
    )?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(
        out,
        "    async findOne({}: {}): Promise<{}> {{",
        pk, pk_type, names.entity
    )?;
    writeln!(
        out,
        "        const entity = await this.{}.findOne({{ where: {{ {} }} }});",
        repo, pk
    )?;
    writeln!(out, "        if (!entity) {{")?;
    writeln!(
        out,
        "            throw new NotFoundException(`{} ${{{}}} not found`);",
        names.entity, pk
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "        return entity;")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(
        out,
        "    async update({}: {}, updateDto: {}): Promise<{}> {{",
        pk, pk_type, names.update_dto, names.entity
    )?;
    writeln!(out, "        const entity = await this.findOne({});", pk)?;
    writeln!(out, "        Object.assign(entity, updateDto);")?;
    writeln!(out, "        return this.{}.save(entity);", repo)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    async remove({}: {}): Promise<void> {{", pk, pk_type)?;
    writeln!(out, "        const result = await this.{}.delete({});", repo, pk)?;
    writeln!(out, "        if (result.affected === 0) {{")?;
    writeln!(
        out,
        "            throw new NotFoundException(`{} ${{{}}} not found`);",
        names.entity, pk
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    async bulkRemove(ids: {}[]): Promise<void> {{", pk_type)?;
    writeln!(out, "        if (!ids || ids.length === 0) {{")?;
    writeln!(out, "            return;")?;
    writeln!(out, "        }}")?;
    writeln!(
        out,
        "        const result = await this.{}.delete({{ {}: In(ids) }} as any);",
        repo, pk
    )?;
    writeln!(out, "        if (result.affected === 0) {{")?;
    writeln!(
        out,
        "            throw new NotFoundException('None of the given ids were found');"
    )?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    Ok(out)
}
