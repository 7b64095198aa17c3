//! Registry of plugin modules found under the plugin output root.
//!
//! Discovery is a directory scan done once; afterwards lookups go through the
//! registration table and never touch the filesystem again.

use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::naming::PLUGIN_CLASS_TAG;
use crate::codegen::utils::to_pascal_case;
use crate::error::Result;

/// Prefix of plugin directories that are disabled
pub const DISABLED_PREFIX: char = '_';

/// Whether the module file exports the class the host loader expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    Ready,
    MissingExport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginEntry {
    pub module_name: String,
    pub class_name: String,
    pub module_file: PathBuf,
    pub status: PluginStatus,
}

/// Class name the host loader resolves for a plugin directory
pub fn plugin_class_name(dir_name: &str) -> String {
    format!("{}{}Module", PLUGIN_CLASS_TAG, to_pascal_case(dir_name))
}

#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    entries: IndexMap<String, PluginEntry>,
    disabled: Vec<String>,
}

impl PluginRegistry {
    /// Scan `plugin_root` for `<dir>/<dir>.module.ts`.
    ///
    /// A missing root yields an empty registry.
    pub fn discover<P: AsRef<Path>>(plugin_root: P) -> Result<Self> {
        let root = plugin_root.as_ref();
        let mut registry = Self::default();

        if !root.is_dir() {
            tracing::warn!("Plugin root {} not found; no plugins registered", root.display());
            return Ok(registry);
        }

        let mut dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            dirs.push((name, entry.path()));
        }
        dirs.sort();

        for (name, path) in dirs {
            if name.starts_with(DISABLED_PREFIX) {
                tracing::info!("Skipping disabled plugin directory {}", name);
                registry.disabled.push(name);
                continue;
            }

            let module_file = path.join(format!("{}.module.ts", name));
            if !module_file.is_file() {
                tracing::warn!("Plugin directory {} has no {}", name, module_file.display());
                continue;
            }

            let class_name = plugin_class_name(&name);
            let source = fs::read_to_string(&module_file)?;
            let status = if source.contains(&format!("export class {}", class_name)) {
                PluginStatus::Ready
            } else {
                tracing::warn!("{} does not export {}", module_file.display(), class_name);
                PluginStatus::MissingExport
            };

            registry.register(PluginEntry {
                module_name: name,
                class_name,
                module_file,
                status,
            });
        }

        tracing::debug!("Registered {} plugin(s)", registry.len());
        Ok(registry)
    }

    /// Add or replace an entry, keeping entries sorted by module name
    pub fn register(&mut self, entry: PluginEntry) {
        self.entries.insert(entry.module_name.clone(), entry);
        self.entries.sort_keys();
    }

    pub fn get(&self, module_name: &str) -> Option<&PluginEntry> {
        self.entries.get(module_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.values()
    }

    pub fn disabled(&self) -> &[String] {
        &self.disabled
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
