//! Module naming derived from a table name and scope.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::codegen::utils::{to_kebab_case, to_pascal_case};
use crate::error::{GeneratorError, Result};

/// Table name prefix that marks a core system table
pub const SYSTEM_TABLE_PREFIX: &str = "sys_";

/// Table name prefix conventionally used by plugin tables
pub const PLUGIN_TABLE_PREFIX: &str = "plugin_";

/// Tag prepended to plugin class names
pub const PLUGIN_CLASS_TAG: &str = "Plugin";

static MODULE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+$").expect("module name pattern is valid"));

/// Ownership of a generated module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Core module with hand-curated menus
    System,
    /// Plugin module with automated menu synchronization
    Plugin,
}

impl Scope {
    /// Tag used in permission keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::System => "system",
            Scope::Plugin => "plugin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Scope::System),
            "plugin" => Some(Scope::Plugin),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of a generated module, derived once per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleIdentity {
    pub scope: Scope,
    /// kebab-case directory and file stem, e.g. `single-page`
    pub module_name: String,
    /// PascalCase entity class, e.g. `SinglePage`
    pub entity_name: String,
    /// PascalCase prefix for service/controller/module/DTO classes
    pub class_prefix: String,
    /// URL path segment, e.g. `plugins/single-page`
    pub api_prefix: String,
}

impl ModuleIdentity {
    /// Permission key prefix, e.g. `plugin:single-page`
    pub fn permission_prefix(&self) -> String {
        format!("{}:{}", self.scope, self.module_name)
    }
}

pub fn is_system_table(table_name: &str) -> bool {
    table_name.starts_with(SYSTEM_TABLE_PREFIX)
}

/// Derive module names for `table_name`.
///
/// `sys_` tables are always system scope and their module name comes from
/// the table name. Every other table is plugin scope and takes its module
/// name verbatim from `scope_hint`, the plugin directory.
pub fn derive_names(table_name: &str, scope_hint: Option<&str>) -> Result<ModuleIdentity> {
    if let Some(rest) = table_name.strip_prefix(SYSTEM_TABLE_PREFIX) {
        let module_name = rest.replace('_', "-");
        let entity_name = to_pascal_case(table_name);
        return Ok(ModuleIdentity {
            scope: Scope::System,
            api_prefix: api_prefix(Scope::System, &module_name),
            class_prefix: entity_name.clone(),
            module_name,
            entity_name,
        });
    }

    let module_name = scope_hint
        .filter(|hint| !hint.trim().is_empty())
        .ok_or_else(|| GeneratorError::MissingScopeHint {
            table: table_name.to_string(),
        })?
        .to_string();

    let bare = table_name
        .strip_prefix(PLUGIN_TABLE_PREFIX)
        .unwrap_or(table_name);

    Ok(ModuleIdentity {
        scope: Scope::Plugin,
        entity_name: to_pascal_case(bare),
        class_prefix: format!("{}{}", PLUGIN_CLASS_TAG, to_pascal_case(&module_name)),
        api_prefix: api_prefix(Scope::Plugin, &module_name),
        module_name,
    })
}

/// URL path segment for a module's controller
pub fn api_prefix(scope: Scope, module_name: &str) -> String {
    match scope {
        Scope::System => format!("system/{}", module_name),
        Scope::Plugin => format!("plugins/{}", module_name),
    }
}

/// Conventional plugin directory for a table whose hint is not known,
/// e.g. `plugin_single_page` -> `single-page`
pub fn infer_plugin_dir(table_name: &str) -> String {
    let bare = table_name
        .strip_prefix(PLUGIN_TABLE_PREFIX)
        .unwrap_or(table_name);
    to_kebab_case(bare)
}

/// Reject names that could escape the output root or break file names
pub fn validate_module_name(name: &str) -> Result<()> {
    if MODULE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(GeneratorError::InvalidModuleName {
            name: name.to_string(),
        })
    }
}
