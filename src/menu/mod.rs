//! Menu / permission tree.
//!
//! Menu nodes form a strict tree of directories, pages and actions. Leaf
//! nodes carry a [`PermissionKey`] which is unique across the tree and is
//! what the authorization guard checks against.

pub mod diesel_repo;
pub mod sync;
pub mod tree;

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::codegen::naming::Scope;
use crate::error::{GeneratorError, Result};

pub use diesel_repo::DieselMenuRepository;
pub use sync::{MenuSyncReport, MenuSynchronizer};
pub use tree::{MenuTree, TreeViolation};

/// Kind of a menu node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    Directory,
    Page,
    Action,
}

impl MenuKind {
    /// Single-letter code stored in the menu table
    pub fn code(&self) -> &'static str {
        match self {
            MenuKind::Directory => "M",
            MenuKind::Page => "C",
            MenuKind::Action => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(MenuKind::Directory),
            "C" => Some(MenuKind::Page),
            "F" => Some(MenuKind::Action),
            _ => None,
        }
    }
}

/// Authorizable action on a generated module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    List,
    Add,
    Update,
    Delete,
}

impl PermissionAction {
    /// Actions that get their own hidden action node under the page
    pub const CRUD: [PermissionAction; 3] = [
        PermissionAction::Add,
        PermissionAction::Update,
        PermissionAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::List => "list",
            PermissionAction::Add => "add",
            PermissionAction::Update => "update",
            PermissionAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(PermissionAction::List),
            "add" => Some(PermissionAction::Add),
            "update" => Some(PermissionAction::Update),
            "delete" => Some(PermissionAction::Delete),
            _ => None,
        }
    }
}

/// Structured permission identifier, rendered as `scope:module:action`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PermissionKey {
    pub scope: Scope,
    pub module: String,
    pub action: PermissionAction,
}

impl PermissionKey {
    pub fn new(scope: Scope, module: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            scope,
            module: module.into(),
            action,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || GeneratorError::InvalidPermissionKey(s.to_string());

        let mut parts = s.split(':');
        let (Some(scope), Some(module), Some(action), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if module.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            scope: Scope::parse(scope).ok_or_else(invalid)?,
            module: module.to_string(),
            action: PermissionAction::parse(action).ok_or_else(invalid)?,
        })
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scope, self.module, self.action.as_str())
    }
}

/// Field values of a menu node, without its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuDraft {
    pub name: String,
    /// `None` (or `Some(0)`) marks a root node
    pub parent_id: Option<i32>,
    pub kind: MenuKind,
    pub route_path: Option<String>,
    pub component_ref: Option<String>,
    pub permission_key: Option<String>,
    pub icon: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub order_index: i32,
}

/// A persisted menu node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub kind: MenuKind,
    pub route_path: Option<String>,
    pub component_ref: Option<String>,
    pub permission_key: Option<String>,
    pub icon: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub order_index: i32,
}

impl MenuNode {
    pub fn from_draft(id: i32, draft: MenuDraft) -> Self {
        Self {
            id,
            name: draft.name,
            parent_id: draft.parent_id,
            kind: draft.kind,
            route_path: draft.route_path,
            component_ref: draft.component_ref,
            permission_key: draft.permission_key,
            icon: draft.icon,
            visible: draft.visible,
            enabled: draft.enabled,
            order_index: draft.order_index,
        }
    }

    pub fn to_draft(&self) -> MenuDraft {
        MenuDraft {
            name: self.name.clone(),
            parent_id: self.parent_id,
            kind: self.kind,
            route_path: self.route_path.clone(),
            component_ref: self.component_ref.clone(),
            permission_key: self.permission_key.clone(),
            icon: self.icon.clone(),
            visible: self.visible,
            enabled: self.enabled,
            order_index: self.order_index,
        }
    }

    /// Parent id with the `0` sentinel folded into `None`
    pub fn parent(&self) -> Option<i32> {
        self.parent_id.filter(|id| *id != 0)
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }
}

/// Persistence operations the synchronizer and rollback engine need
pub trait MenuRepository {
    /// Find a node by `(name, parent)`; a `None` parent matches root nodes
    fn find_by_natural_key(&mut self, name: &str, parent_id: Option<i32>) -> Result<Option<MenuNode>>;

    fn find_by_permission_key(&mut self, key: &PermissionKey) -> Result<Option<MenuNode>>;

    fn find_children(&mut self, parent_id: i32) -> Result<Vec<MenuNode>>;

    /// Every node, ordered by `order_index` then id
    fn list(&mut self) -> Result<Vec<MenuNode>>;

    fn create(&mut self, draft: &MenuDraft) -> Result<MenuNode>;

    fn update(&mut self, id: i32, draft: &MenuDraft) -> Result<MenuNode>;

    fn delete(&mut self, id: i32) -> Result<()>;
}

/// Menu repository held in memory, with sequential ids
#[derive(Debug, Clone, Default)]
pub struct InMemoryMenuRepository {
    nodes: IndexMap<i32, MenuNode>,
    next_id: i32,
}

impl InMemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&MenuNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MenuNode> {
        self.nodes.values()
    }
}

impl MenuRepository for InMemoryMenuRepository {
    fn find_by_natural_key(&mut self, name: &str, parent_id: Option<i32>) -> Result<Option<MenuNode>> {
        let parent_id = parent_id.filter(|id| *id != 0);
        Ok(self
            .nodes
            .values()
            .find(|n| n.name == name && n.parent() == parent_id)
            .cloned())
    }

    fn find_by_permission_key(&mut self, key: &PermissionKey) -> Result<Option<MenuNode>> {
        let key = key.to_string();
        Ok(self
            .nodes
            .values()
            .find(|n| n.permission_key.as_deref() == Some(key.as_str()))
            .cloned())
    }

    fn find_children(&mut self, parent_id: i32) -> Result<Vec<MenuNode>> {
        Ok(self
            .nodes
            .values()
            .filter(|n| n.parent() == Some(parent_id))
            .cloned()
            .collect())
    }

    fn list(&mut self) -> Result<Vec<MenuNode>> {
        let mut nodes: Vec<_> = self.nodes.values().cloned().collect();
        nodes.sort_by_key(|n| (n.order_index, n.id));
        Ok(nodes)
    }

    fn create(&mut self, draft: &MenuDraft) -> Result<MenuNode> {
        self.next_id += 1;
        let node = MenuNode::from_draft(self.next_id, draft.clone());
        self.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    fn update(&mut self, id: i32, draft: &MenuDraft) -> Result<MenuNode> {
        let slot = self
            .nodes
            .get_mut(&id)
            .ok_or(GeneratorError::MenuNotFound { id })?;
        *slot = MenuNode::from_draft(id, draft.clone());
        Ok(slot.clone())
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        self.nodes
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(GeneratorError::MenuNotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, parent_id: Option<i32>, key: Option<&str>) -> MenuDraft {
        MenuDraft {
            name: name.to_string(),
            parent_id,
            kind: MenuKind::Page,
            route_path: None,
            component_ref: None,
            permission_key: key.map(str::to_string),
            icon: None,
            visible: true,
            enabled: true,
            order_index: 0,
        }
    }

    #[test]
    fn test_permission_key_display_and_parse() {
        let key = PermissionKey::new(Scope::Plugin, "single-page", PermissionAction::List);
        assert_eq!(key.to_string(), "plugin:single-page:list");
        assert_eq!(PermissionKey::parse("plugin:single-page:list").unwrap(), key);
    }

    #[test]
    fn test_permission_key_rejects_malformed_input() {
        for bad in ["plugin:x", "app:x:list", "plugin:x:export", "plugin::list", "a:b:c:d"] {
            assert!(
                matches!(PermissionKey::parse(bad), Err(GeneratorError::InvalidPermissionKey(_))),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_menu_kind_codes() {
        for kind in [MenuKind::Directory, MenuKind::Page, MenuKind::Action] {
            assert_eq!(MenuKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(MenuKind::from_code("X"), None);
    }

    #[test]
    fn test_in_memory_natural_key_treats_zero_as_root() {
        let mut repo = InMemoryMenuRepository::new();
        repo.create(&draft("Tools", Some(0), None)).unwrap();

        assert!(repo.find_by_natural_key("Tools", None).unwrap().is_some());
        assert!(repo.find_by_natural_key("Tools", Some(7)).unwrap().is_none());
    }

    #[test]
    fn test_in_memory_crud() {
        let mut repo = InMemoryMenuRepository::new();
        let dir = repo.create(&draft("Plugins", None, None)).unwrap();
        let page = repo
            .create(&draft("Notes", Some(dir.id), Some("plugin:notes:list")))
            .unwrap();

        let key = PermissionKey::parse("plugin:notes:list").unwrap();
        assert_eq!(repo.find_by_permission_key(&key).unwrap().unwrap().id, page.id);
        assert_eq!(repo.find_children(dir.id).unwrap().len(), 1);

        let mut changed = page.to_draft();
        changed.name = "Notebook".to_string();
        assert_eq!(repo.update(page.id, &changed).unwrap().name, "Notebook");

        repo.delete(page.id).unwrap();
        assert!(matches!(
            repo.delete(page.id),
            Err(GeneratorError::MenuNotFound { .. })
        ));
        assert_eq!(repo.len(), 1);
    }
}
