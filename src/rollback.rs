//! Removal of generated modules.
//!
//! Deletion is best effort: directories are removed first, then the plugin's
//! menu nodes. A menu failure is logged and does not restore the directories.

use serde::Serialize;
use std::path::PathBuf;

use crate::codegen::fs_utils;
use crate::codegen::naming::{derive_names, infer_plugin_dir, is_system_table, validate_module_name, ModuleIdentity, Scope};
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::menu::{MenuRepository, PermissionAction, PermissionKey};

/// Core tables whose modules must never be removed
pub const PROTECTED_TABLES: &[&str] = &[
    "sys_user",
    "sys_role",
    "sys_menu",
    "sys_user_role",
    "sys_role_menu",
    "users",
    "roles",
    "menus",
    "user_roles",
    "role_menus",
];

pub fn is_protected(table_name: &str) -> bool {
    let lowered = table_name.to_lowercase();
    PROTECTED_TABLES.contains(&lowered.as_str())
}

/// What a deletion actually removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub identity: ModuleIdentity,
    pub removed_paths: Vec<PathBuf>,
    pub removed_menu_ids: Vec<i32>,
}

/// Identity of a previously generated module.
///
/// Plugin tables without a hint fall back to the conventional directory.
pub fn resolve_identity(table_name: &str, scope_hint: Option<&str>) -> Result<ModuleIdentity> {
    if is_system_table(table_name) {
        return derive_names(table_name, None);
    }
    let hint = scope_hint
        .map(str::to_string)
        .unwrap_or_else(|| infer_plugin_dir(table_name));
    derive_names(table_name, Some(&hint))
}

pub struct RollbackEngine<'a, M: MenuRepository> {
    config: &'a GeneratorConfig,
    menus: &'a mut M,
}

impl<'a, M: MenuRepository> RollbackEngine<'a, M> {
    pub fn new(config: &'a GeneratorConfig, menus: &'a mut M) -> Self {
        Self { config, menus }
    }

    /// Remove the generated directories of `table_name` and, for plugins,
    /// its page and action menu nodes. The parent directory node is kept.
    pub fn delete(&mut self, table_name: &str, scope_hint: Option<&str>) -> Result<RemovalReport> {
        if is_protected(table_name) {
            return Err(GeneratorError::ProtectedResource {
                table: table_name.to_string(),
            });
        }

        let identity = resolve_identity(table_name, scope_hint)?;
        validate_module_name(&identity.module_name)?;

        let mut removed_paths = Vec::new();
        // Only plugin modules own a generated front-end directory.
        let web_dir = match identity.scope {
            Scope::Plugin => self.config.web_dir(&identity),
            Scope::System => None,
        };
        let dirs = std::iter::once(self.config.module_dir(&identity)).chain(web_dir);
        for dir in dirs {
            if fs_utils::remove_dir_if_exists(&dir)? {
                tracing::info!("Removed {}", dir.display());
                removed_paths.push(dir);
            } else {
                tracing::debug!("Nothing to remove at {}", dir.display());
            }
        }

        let removed_menu_ids = if identity.scope == Scope::Plugin {
            self.remove_menu_nodes(&identity)
        } else {
            Vec::new()
        };

        Ok(RemovalReport {
            identity,
            removed_paths,
            removed_menu_ids,
        })
    }

    /// Delete action nodes before the page so no child is left dangling
    fn remove_menu_nodes(&mut self, identity: &ModuleIdentity) -> Vec<i32> {
        let mut removed = Vec::new();
        let key = |action| PermissionKey::new(identity.scope, identity.module_name.clone(), action);

        for action in PermissionAction::CRUD {
            let key = key(action);
            match self.remove_by_key(&key) {
                Ok(Some(id)) => removed.push(id),
                Ok(None) => tracing::warn!("No menu node found for {}", key),
                Err(e) => tracing::warn!("Failed to remove menu node for {}: {}", key, e),
            }
        }

        let page_key = key(PermissionAction::List);
        match self.remove_page(&page_key, &mut removed) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("No menu node found for {}", page_key),
            Err(e) => tracing::warn!("Failed to remove menu node for {}: {}", page_key, e),
        }
        removed
    }

    /// Remove the page along with any children added by hand
    fn remove_page(&mut self, key: &PermissionKey, removed: &mut Vec<i32>) -> Result<bool> {
        let Some(page) = self.menus.find_by_permission_key(key)? else {
            return Ok(false);
        };
        for child in self.menus.find_children(page.id)? {
            self.menus.delete(child.id)?;
            tracing::info!("Removed menu node '{}' ({}) under {}", child.name, child.id, key);
            removed.push(child.id);
        }
        self.menus.delete(page.id)?;
        tracing::info!("Removed menu node '{}' ({}) for {}", page.name, page.id, key);
        removed.push(page.id);
        Ok(true)
    }

    fn remove_by_key(&mut self, key: &PermissionKey) -> Result<Option<i32>> {
        let Some(node) = self.menus.find_by_permission_key(key)? else {
            return Ok(None);
        };
        self.menus.delete(node.id)?;
        tracing::info!("Removed menu node '{}' ({}) for {}", node.name, node.id, key);
        Ok(Some(node.id))
    }
}
