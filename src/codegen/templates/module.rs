use std::fmt::Write;

use super::{import_path, ClassNames, RenderResult};
use crate::codegen::artifacts::ArtifactKind;
use crate::codegen::context::GenerationContext;

pub(super) fn render(ctx: &GenerationContext) -> RenderResult {
    let names = ClassNames::of(ctx);

    let mut out = String::new();
    writeln!(out, "import {{ Module }} from '@nestjs/common';")?;
    writeln!(out, "import {{ TypeOrmModule }} from '@nestjs/typeorm';")?;
    for (class, kind) in [
        (&names.entity, ArtifactKind::Entity),
        (&names.service, ArtifactKind::Service),
        (&names.controller, ArtifactKind::Controller),
    ] {
        writeln!(out, "import {{ {} }} from '{}';", class, import_path(kind, ctx))?;
    }
    writeln!(out)?;
    writeln!(out, "@Module({{")?;
    writeln!(
        out,
        "    imports: [TypeOrmModule.forFeature([{}])],",
        names.entity
    )?;
    writeln!(out, "    controllers: [{}],", names.controller)?;
    writeln!(out, "    providers: [{}],", names.service)?;
    writeln!(out, "    exports: [{}],", names.service)?;
    writeln!(out, "}})")?;
    writeln!(out, "export class {} {{}}", names.module)?;
    Ok(out)
}
