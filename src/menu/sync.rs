//! Menu/permission reconciliation for generated plugin modules.
//!
//! Directory nodes are matched by `(name, parent)`; page and action nodes are
//! matched by their permission key. A second run over an unchanged module
//! finds every node already in its desired state and writes nothing.
//!
//! Two concurrent runs for new plugins can both miss an absent directory and
//! create it twice; nothing here serializes them.

use serde::Serialize;

use crate::codegen::naming::{ModuleIdentity, Scope};
use crate::codegen::utils::to_title_case;
use crate::config::MenuDirectoryConfig;
use crate::error::Result;
use crate::menu::{MenuDraft, MenuKind, MenuNode, MenuRepository, PermissionAction, PermissionKey};

/// Ids of the reconciled nodes and what happened to them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MenuSyncReport {
    pub directory_id: i32,
    pub page_id: i32,
    pub action_ids: Vec<i32>,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl MenuSyncReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

/// Human readable module name, e.g. `SysNotice` -> `Notice`, `SinglePage` -> `Single Page`
pub fn display_name(identity: &ModuleIdentity) -> String {
    let title = to_title_case(&identity.entity_name);
    title
        .strip_prefix("Sys ")
        .map(str::to_string)
        .unwrap_or(title)
}

pub struct MenuSynchronizer<'a, M: MenuRepository> {
    repo: &'a mut M,
    directory: &'a MenuDirectoryConfig,
}

impl<'a, M: MenuRepository> MenuSynchronizer<'a, M> {
    pub fn new(repo: &'a mut M, directory: &'a MenuDirectoryConfig) -> Self {
        Self { repo, directory }
    }

    /// Ensure the directory, page and action nodes of a plugin module exist.
    ///
    /// System modules keep their hand-curated menus and are skipped (`None`).
    pub fn sync(&mut self, identity: &ModuleIdentity) -> Result<Option<MenuSyncReport>> {
        if identity.scope == Scope::System {
            tracing::debug!(
                "Skipping menu sync for system module '{}'",
                identity.module_name
            );
            return Ok(None);
        }

        let mut report = MenuSyncReport::default();

        let directory = self.ensure_directory(&mut report)?;
        report.directory_id = directory.id;

        let page_key = PermissionKey::new(
            identity.scope,
            identity.module_name.clone(),
            PermissionAction::List,
        );
        let page = self.upsert(&page_key, page_draft(identity, &page_key, directory.id), &mut report)?;
        report.page_id = page.id;

        for (order, action) in PermissionAction::CRUD.into_iter().enumerate() {
            let key = PermissionKey::new(identity.scope, identity.module_name.clone(), action);
            let draft = action_draft(identity, &key, page.id, order as i32 + 1);
            let node = self.upsert(&key, draft, &mut report)?;
            report.action_ids.push(node.id);
        }

        tracing::info!(
            "Menu sync for '{}': {} created, {} updated, {} unchanged",
            identity.module_name,
            report.created,
            report.updated,
            report.unchanged
        );

        Ok(Some(report))
    }

    fn ensure_directory(&mut self, report: &mut MenuSyncReport) -> Result<MenuNode> {
        if let Some(existing) = self.repo.find_by_natural_key(&self.directory.name, None)? {
            report.unchanged += 1;
            return Ok(existing);
        }

        let node = self.repo.create(&MenuDraft {
            name: self.directory.name.clone(),
            parent_id: None,
            kind: MenuKind::Directory,
            route_path: Some(self.directory.route.clone()),
            component_ref: Some("Layout".to_string()),
            permission_key: None,
            icon: Some(self.directory.icon.clone()),
            visible: true,
            enabled: true,
            order_index: self.directory.order,
        })?;
        tracing::info!("Created menu directory '{}' ({})", node.name, node.id);
        report.created += 1;
        Ok(node)
    }

    fn upsert(
        &mut self,
        key: &PermissionKey,
        mut desired: MenuDraft,
        report: &mut MenuSyncReport,
    ) -> Result<MenuNode> {
        let Some(existing) = self.repo.find_by_permission_key(key)? else {
            let node = self.repo.create(&desired)?;
            tracing::info!("Created menu node '{}' ({}) for {}", node.name, node.id, key);
            report.created += 1;
            return Ok(node);
        };

        // Ordering, icon and enablement belong to administrators once a node exists.
        desired.order_index = existing.order_index;
        desired.icon = existing.icon.clone();
        desired.enabled = existing.enabled;

        if existing.to_draft() == desired {
            tracing::debug!("Menu node {} for {} is up to date", existing.id, key);
            report.unchanged += 1;
            return Ok(existing);
        }

        let node = self.repo.update(existing.id, &desired)?;
        tracing::info!("Updated menu node '{}' ({}) for {}", node.name, node.id, key);
        report.updated += 1;
        Ok(node)
    }
}

fn page_draft(identity: &ModuleIdentity, key: &PermissionKey, directory_id: i32) -> MenuDraft {
    MenuDraft {
        name: display_name(identity),
        parent_id: Some(directory_id),
        kind: MenuKind::Page,
        route_path: Some(format!("/{}", identity.api_prefix)),
        component_ref: Some(format!("{}/index", identity.module_name)),
        permission_key: Some(key.to_string()),
        icon: None,
        visible: true,
        enabled: true,
        order_index: 0,
    }
}

fn action_draft(identity: &ModuleIdentity, key: &PermissionKey, page_id: i32, order: i32) -> MenuDraft {
    let verb = to_title_case(key.action.as_str());
    MenuDraft {
        name: format!("{} {}", verb, display_name(identity)),
        parent_id: Some(page_id),
        kind: MenuKind::Action,
        route_path: None,
        component_ref: None,
        permission_key: Some(key.to_string()),
        icon: None,
        visible: false,
        enabled: true,
        order_index: order,
    }
}
