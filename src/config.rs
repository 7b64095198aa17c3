//! Generator configuration loaded from `tablegen.yaml`
//!
//! Every section has defaults, so a missing file is not an error. Environment
//! variables are applied on top of the file:
//!
//! - `DATABASE_URL` - database connection string
//! - `TABLEGEN_BACKEND_ROOT` - root of the backend source tree
//! - `TABLEGEN_WEB_ROOT` - views directory of the front-end project

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::naming::{ModuleIdentity, Scope};
use crate::diesel_runtime::DatabaseConfig;
use crate::error::{GeneratorError, Result};

/// Default config file name looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "tablegen.yaml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Where generated files go
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_backend_root")]
    pub backend_root: PathBuf,
    #[serde(default = "default_system_dir")]
    pub system_dir: String,
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: String,
    /// Front-end views directory; plugin generation fails without it
    #[serde(default)]
    pub web_root: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend_root: default_backend_root(),
            system_dir: default_system_dir(),
            plugin_dir: default_plugin_dir(),
            web_root: None,
        }
    }
}

fn default_backend_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_system_dir() -> String {
    "system".to_string()
}

fn default_plugin_dir() -> String {
    "plugins".to_string()
}

/// Menu synchronization settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MenuConfig {
    #[serde(default)]
    pub directory: MenuDirectoryConfig,
}

/// Parent directory node that plugin pages are attached to
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuDirectoryConfig {
    #[serde(default = "default_directory_name")]
    pub name: String,
    #[serde(default = "default_directory_route")]
    pub route: String,
    #[serde(default = "default_directory_icon")]
    pub icon: String,
    #[serde(default = "default_directory_order")]
    pub order: i32,
}

impl Default for MenuDirectoryConfig {
    fn default() -> Self {
        Self {
            name: default_directory_name(),
            route: default_directory_route(),
            icon: default_directory_icon(),
            order: default_directory_order(),
        }
    }
}

fn default_directory_name() -> String {
    "Plugins".to_string()
}

fn default_directory_route() -> String {
    "/plugins".to_string()
}

fn default_directory_icon() -> String {
    "appstore".to_string()
}

fn default_directory_order() -> i32 {
    90
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GeneratorError::Config(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| GeneratorError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the file if it exists, fall back to defaults, then apply the environment
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Ok(root) = std::env::var("TABLEGEN_BACKEND_ROOT") {
            self.output.backend_root = PathBuf::from(root);
        }
        if let Ok(root) = std::env::var("TABLEGEN_WEB_ROOT") {
            self.output.web_root = Some(PathBuf::from(root));
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database
            .url
            .as_deref()
            .ok_or_else(|| GeneratorError::Config("no database url (set DATABASE_URL)".to_string()))
    }

    /// Root directory for all modules of `scope`
    pub fn scope_root(&self, scope: Scope) -> PathBuf {
        let dir = match scope {
            Scope::System => &self.output.system_dir,
            Scope::Plugin => &self.output.plugin_dir,
        };
        self.output.backend_root.join(dir)
    }

    /// Backend directory of one module
    pub fn module_dir(&self, identity: &ModuleIdentity) -> PathBuf {
        self.scope_root(identity.scope).join(&identity.module_name)
    }

    /// Front-end directory of one module, if a web root is configured
    pub fn web_dir(&self, identity: &ModuleIdentity) -> Option<PathBuf> {
        self.output
            .web_root
            .as_ref()
            .map(|root| root.join(&identity.module_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::naming::derive_names;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = GeneratorConfig::from_yaml("{}").unwrap();
        assert_eq!(config.output.backend_root, PathBuf::from("src"));
        assert_eq!(config.menu.directory.name, "Plugins");
        assert!(config.output.web_root.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = GeneratorConfig::from_yaml(
            "output:\n  web_root: ../admin-web/src/views\nmenu:\n  directory:\n    name: Tools\n",
        )
        .unwrap();
        assert_eq!(
            config.output.web_root,
            Some(PathBuf::from("../admin-web/src/views"))
        );
        assert_eq!(config.output.plugin_dir, "plugins");
        assert_eq!(config.menu.directory.name, "Tools");
        assert_eq!(config.menu.directory.route, "/plugins");
    }

    #[test]
    fn test_example_config_parses() {
        let config = GeneratorConfig::from_yaml(include_str!("../tablegen.example.yaml")).unwrap();
        assert_eq!(config.menu.directory.order, 90);
        assert_eq!(config.database.max_connections, 4);
        assert!(config.database_url().is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_a_config_error() {
        assert!(matches!(
            GeneratorConfig::from_yaml("output: ["),
            Err(GeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_module_paths() {
        let config = GeneratorConfig::default();
        let system = derive_names("sys_notice", None).unwrap();
        let plugin = derive_names("plugin_single_page", Some("single-page")).unwrap();

        assert_eq!(config.module_dir(&system), PathBuf::from("src/system/notice"));
        assert_eq!(
            config.module_dir(&plugin),
            PathBuf::from("src/plugins/single-page")
        );
        assert!(config.web_dir(&plugin).is_none());
    }
}
