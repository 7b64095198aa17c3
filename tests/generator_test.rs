//! End-to-end generation against an in-memory catalog and menu store.

use std::fs;
use std::path::{Path, PathBuf};

use tablegen::codegen::WriteStatus;
use tablegen::menu::{MenuKind, PermissionAction};
use tablegen::schema::{ColumnDescriptor, TableDescriptor};
use tablegen::{
    CodeGenerator, GeneratorConfig, GeneratorError, InMemoryMenuRepository, InMemorySchema,
    MenuRepository, MenuTree, ModuleSpec, PermissionKey, Scope, TableFilter,
};

type TestGenerator = CodeGenerator<InMemorySchema, InMemoryMenuRepository>;

fn single_page_table() -> TableDescriptor {
    TableDescriptor::new(
        "plugin_single_page",
        vec![
            ColumnDescriptor::new("id", "int").primary_key().auto_generated(),
            ColumnDescriptor::new("title", "varchar(255)")
                .with_length(255)
                .with_comment("Page title"),
            ColumnDescriptor::new("content", "text"),
            ColumnDescriptor::new("status", "tinyint(1)"),
            ColumnDescriptor::new("created_at", "datetime"),
            ColumnDescriptor::new("updated_at", "datetime"),
        ],
    )
    .with_comment("Single pages")
}

fn notice_table() -> TableDescriptor {
    TableDescriptor::new(
        "sys_notice",
        vec![
            ColumnDescriptor::new("notice_id", "bigint").primary_key().auto_generated(),
            ColumnDescriptor::new("notice_title", "varchar(50)").with_length(50),
        ],
    )
}

fn config(root: &Path) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.output.backend_root = root.join("server/src");
    config.output.web_root = Some(root.join("web/src/views"));
    config
}

fn generator(root: &Path) -> TestGenerator {
    let schema = InMemorySchema::new()
        .with_table(single_page_table())
        .with_table(notice_table())
        .with_table(TableDescriptor::new(
            "plugin_no_key",
            vec![ColumnDescriptor::new("title", "varchar(20)")],
        ));
    CodeGenerator::new(config(root), schema, InMemoryMenuRepository::new())
}

fn snapshot(paths: &[PathBuf]) -> Vec<(PathBuf, Vec<u8>)> {
    paths
        .iter()
        .map(|p| (p.clone(), fs::read(p).unwrap()))
        .collect()
}

#[test]
fn test_plugin_generation_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());

    let report = generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();

    assert_eq!(report.identity.scope, Scope::Plugin);
    assert_eq!(report.generated_paths.len(), 10);
    for path in &report.generated_paths {
        assert!(path.exists(), "{} missing", path.display());
    }

    let module_dir = dir.path().join("server/src/plugins/single-page");
    let controller = fs::read_to_string(module_dir.join("single-page.controller.ts")).unwrap();
    assert!(controller.contains("@Controller('plugins/single-page')"));
    assert!(controller.contains("@RequirePermissions('plugin:single-page:add')"));

    let entity = fs::read_to_string(module_dir.join("single-page.entity.ts")).unwrap();
    assert!(entity.contains("    status: number;"));
    assert!(entity.contains("@CreateDateColumn"));

    assert!(dir
        .path()
        .join("web/src/views/single-page/single-page.page.ts")
        .exists());
    assert!(dir.path().join("web/src/views/single-page/index.vue").exists());

    let menu = report.menu.unwrap();
    assert_eq!(menu.created, 5);
}

#[test]
fn test_regeneration_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());

    let first = generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();
    let files_before = snapshot(&first.generated_paths);
    let menus_before = generator.menus_mut().list().unwrap();

    let second = generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();

    assert_eq!(first.generated_paths, second.generated_paths);
    assert_eq!(snapshot(&second.generated_paths), files_before);
    assert!(second
        .files
        .iter()
        .all(|f| f.status == WriteStatus::Unchanged));
    assert_eq!(second.changed_files(), 0);

    let menu = second.menu.unwrap();
    assert!(menu.is_noop());
    assert_eq!(generator.menus_mut().list().unwrap(), menus_before);
}

#[test]
fn test_menu_tree_invariant_after_sync() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();

    let tree = generator.menu_tree().unwrap();
    assert!(tree.is_valid(), "{:?}", tree.violations());

    for node in generator.menus().nodes() {
        if node.kind != MenuKind::Action {
            continue;
        }
        assert!(!node.visible);
        let page = tree.parent_of(node.id).expect("action has a parent");
        assert_eq!(page.kind, MenuKind::Page);
        let directory = tree.parent_of(page.id).expect("page has a parent");
        assert_eq!(directory.kind, MenuKind::Directory);
        assert!(directory.is_root());
    }
}

#[test]
fn test_system_generation_skips_menus() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());

    let report = generator.generate("sys_notice", None).unwrap();

    assert_eq!(report.identity.module_name, "notice");
    assert_eq!(report.generated_paths.len(), 8);
    assert!(report.menu.is_none());
    assert!(generator.menus().is_empty());
    assert!(!dir.path().join("web").exists());

    let service = fs::read_to_string(
        dir.path()
            .join("server/src/system/notice/notice.service.ts"),
    )
    .unwrap();
    assert!(service.contains("export class SysNoticeService extends BaseService<SysNotice>"));
}

#[test]
fn test_invalid_name_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());

    let result = generator.generate("bad name!", Some("single-page"));
    assert!(matches!(result, Err(GeneratorError::InvalidModuleName { .. })));

    let result = generator.generate("plugin_single_page", Some("../escape"));
    assert!(matches!(result, Err(GeneratorError::InvalidModuleName { .. })));

    assert!(!dir.path().join("server").exists());
    assert!(!dir.path().join("web").exists());
    assert!(generator.menus().is_empty());
}

#[test]
fn test_plugin_table_requires_hint() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());

    let result = generator.generate("plugin_single_page", None);
    assert!(matches!(result, Err(GeneratorError::MissingScopeHint { .. })));
    assert!(result.unwrap_err().is_client_error());
}

#[test]
fn test_plugin_generation_requires_web_root() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.output.web_root = None;
    let schema = InMemorySchema::new().with_table(single_page_table());
    let mut generator = CodeGenerator::new(config, schema, InMemoryMenuRepository::new());

    let result = generator.generate("plugin_single_page", Some("single-page"));
    assert!(matches!(result, Err(GeneratorError::MissingWebRoot { .. })));
    assert!(!dir.path().join("server").exists());
}

#[test]
fn test_unknown_table_and_missing_primary_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());

    assert!(matches!(
        generator.generate("sys_missing", None),
        Err(GeneratorError::SchemaNotFound { .. })
    ));
    assert!(matches!(
        generator.generate("plugin_no_key", Some("no-key")),
        Err(GeneratorError::PrimaryKeyViolation { found: 0, .. })
    ));
    assert!(!dir.path().join("server").exists());
}

#[test]
fn test_generate_then_delete_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    let generated = generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();

    let removed = generator
        .delete_generated("plugin_single_page", Some("single-page"))
        .unwrap();

    assert_eq!(removed.removed_paths.len(), 2);
    assert!(!dir.path().join("server/src/plugins/single-page").exists());
    assert!(!dir.path().join("web/src/views/single-page").exists());

    let list_key = PermissionKey::new(Scope::Plugin, "single-page", PermissionAction::List);
    assert!(generator
        .menus_mut()
        .find_by_permission_key(&list_key)
        .unwrap()
        .is_none());

    let menu = generated.menu.unwrap();
    assert_eq!(generator.menus().len(), 1);
    assert!(generator.menus().get(menu.directory_id).is_some());
    assert!(MenuTree::build(generator.menus_mut().list().unwrap()).is_valid());
}

#[test]
fn test_protected_table_deletion_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();
    let user_module = dir.path().join("server/src/system/user");
    fs::create_dir_all(&user_module).unwrap();
    let menus_before = generator.menus_mut().list().unwrap();

    let result = generator.delete_generated("sys_user", None);

    assert!(matches!(result, Err(GeneratorError::ProtectedResource { .. })));
    assert!(user_module.exists());
    assert_eq!(generator.menus_mut().list().unwrap(), menus_before);
}

#[test]
fn test_generate_from_spec() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    let spec = ModuleSpec::from_yaml(
        "module_name: announcement\n\
         entity_name: SysAnnouncement\n\
         fields:\n  \
           - name: headline\n    type: string\n    comment: Headline\n  \
           - name: pinned\n    type: boolean\n",
    )
    .unwrap();

    let report = generator.generate_from_spec(&spec).unwrap();

    assert_eq!(report.identity.scope, Scope::System);
    assert_eq!(report.generated_paths.len(), 8);
    assert!(report.menu.is_none());

    let entity = fs::read_to_string(
        dir.path()
            .join("server/src/system/announcement/announcement.entity.ts"),
    )
    .unwrap();
    assert!(entity.contains("@Entity('sys_announcement')"));
    assert!(entity.contains("export class SysAnnouncement {"));
    assert!(entity.contains("    @PrimaryGeneratedColumn"));
    assert!(entity.contains("    pinned: boolean;"));
}

#[test]
fn test_demo_spec_generates() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    let spec = ModuleSpec::from_file(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/announcement.module.yaml"),
    )
    .unwrap();

    let report = generator.generate_from_spec(&spec).unwrap();
    let dto = fs::read_to_string(
        dir.path()
            .join("server/src/system/announcement/dto/create-announcement.dto.ts"),
    )
    .unwrap();
    assert!(dto.contains("export class CreateSysAnnouncementDto {"));
    assert!(dto.contains("    publishedAt?: Date;"));
    assert_eq!(report.changed_files(), 8);
}

#[test]
fn test_list_tables_marks_generated_modules() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();

    let all = generator.list_tables(&TableFilter::default()).unwrap();
    let names: Vec<_> = all.iter().map(|t| t.table_name.as_str()).collect();
    assert_eq!(names, vec!["plugin_no_key", "plugin_single_page", "sys_notice"]);
    assert!(all[1].is_generated);
    assert!(!all[2].is_generated);

    let generated = generator
        .list_tables(&TableFilter {
            search: None,
            is_generated: Some(true),
        })
        .unwrap();
    assert_eq!(generated.len(), 1);

    let by_comment = generator
        .list_tables(&TableFilter {
            search: Some("single pages".to_string()),
            is_generated: None,
        })
        .unwrap();
    assert_eq!(by_comment.len(), 1);
}

#[test]
fn test_generated_plugins_are_discovered() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator(dir.path());
    generator
        .generate("plugin_single_page", Some("single-page"))
        .unwrap();

    let registry = generator.plugins().unwrap();
    let entry = registry.get("single-page").unwrap();
    assert_eq!(entry.class_name, "PluginSinglePageModule");
    assert_eq!(entry.status, tablegen::plugins::PluginStatus::Ready);
}
