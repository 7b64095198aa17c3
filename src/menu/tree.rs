//! Menu forest built from flat parent-linked records.
//!
//! Nodes live in one `Vec`; parent/child links are indices into it, so the
//! structure has no ownership cycles and can be walked in either direction.

use std::collections::HashMap;
use std::fmt::Write;

use crate::menu::{MenuKind, MenuNode};

/// Structural problem found in a menu forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    /// Parent id does not resolve to any node
    Orphan { id: i32, parent_id: i32 },
    /// Following parent links from this node returns to it
    Cycle { id: i32 },
    /// Two nodes share one permission key
    DuplicatePermission { key: String, ids: Vec<i32> },
}

#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    violations: Vec<TreeViolation>,
}

impl MenuTree {
    /// Build the forest in two passes: index every node by id, then attach
    /// each node to its parent's child list.
    pub fn build(mut nodes: Vec<MenuNode>) -> Self {
        nodes.sort_by_key(|n| (n.order_index, n.id));

        let index: HashMap<i32, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut parent = vec![None; nodes.len()];
        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        let mut violations = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            match node.parent() {
                None => roots.push(i),
                Some(parent_id) => match index.get(&parent_id) {
                    Some(&p) => {
                        parent[i] = Some(p);
                        children[p].push(i);
                    }
                    None => {
                        violations.push(TreeViolation::Orphan {
                            id: node.id,
                            parent_id,
                        });
                        roots.push(i);
                    }
                },
            }
        }

        for i in 0..nodes.len() {
            let mut steps = 0;
            let mut cursor = parent[i];
            while let Some(p) = cursor {
                if p == i {
                    violations.push(TreeViolation::Cycle { id: nodes[i].id });
                    break;
                }
                steps += 1;
                if steps > nodes.len() {
                    break;
                }
                cursor = parent[p];
            }
        }

        let mut by_key: HashMap<&str, Vec<i32>> = HashMap::new();
        for node in &nodes {
            if let Some(key) = node.permission_key.as_deref() {
                by_key.entry(key).or_default().push(node.id);
            }
        }
        let mut duplicates: Vec<_> = by_key
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(key, ids)| TreeViolation::DuplicatePermission {
                key: key.to_string(),
                ids,
            })
            .collect();
        duplicates.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
        violations.extend(duplicates);

        Self {
            nodes,
            parent,
            children,
            roots,
            violations,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &MenuNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    pub fn get(&self, id: i32) -> Option<&MenuNode> {
        self.position(id).map(|i| &self.nodes[i])
    }

    pub fn children(&self, id: i32) -> Vec<&MenuNode> {
        self.position(id)
            .map(|i| self.children[i].iter().map(|&c| &self.nodes[c]).collect())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, id: i32) -> Option<&MenuNode> {
        self.position(id)
            .and_then(|i| self.parent[i])
            .map(|p| &self.nodes[p])
    }

    /// Number of ancestors; `None` for unknown ids or nodes on a cycle
    pub fn depth(&self, id: i32) -> Option<usize> {
        let start = self.position(id)?;
        let mut depth = 0;
        let mut cursor = self.parent[start];
        while let Some(p) = cursor {
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
            cursor = self.parent[p];
        }
        Some(depth)
    }

    pub fn violations(&self) -> &[TreeViolation] {
        &self.violations
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Indented text rendering, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, i: usize, level: usize, out: &mut String) {
        // Cycles never reach a root, so recursion from roots terminates.
        let node = &self.nodes[i];
        let marker = match node.kind {
            MenuKind::Directory => "+",
            MenuKind::Page => "-",
            MenuKind::Action => "*",
        };
        let _ = write!(out, "{}{} {} [{}]", "  ".repeat(level), marker, node.name, node.id);
        if let Some(key) = &node.permission_key {
            let _ = write!(out, " {}", key);
        }
        out.push('\n');
        for &child in &self.children[i] {
            self.render_node(child, level + 1, out);
        }
    }

    fn position(&self, id: i32) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }
}
