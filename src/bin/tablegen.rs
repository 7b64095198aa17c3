//! tablegen CLI - generate admin modules from live database tables
//!
//! Reads `tablegen.yaml` (or `--config`), applies `DATABASE_URL`,
//! `TABLEGEN_BACKEND_ROOT` and `TABLEGEN_WEB_ROOT` from the environment or a
//! `.env` file, and runs one operation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use tablegen::codegen::WriteStatus;
use tablegen::config::DEFAULT_CONFIG_FILE;
use tablegen::plugins::PluginStatus;
use tablegen::{
    CodeGenerator, Database, DieselMenuRepository, DieselSchemaSource, GeneratorConfig,
    GeneratorError, InMemoryMenuRepository, InMemorySchema, ModuleSpec, PluginRegistry, Scope,
    TableFilter,
};

#[derive(Parser)]
#[command(name = "tablegen")]
#[command(version, about = "Generate admin CRUD modules and menus from database tables", long_about = None)]
struct Cli {
    /// Path to the generator config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate (or regenerate) the module for a table
    Generate {
        /// Table to generate from
        #[arg(short, long)]
        table: String,

        /// Plugin directory name; required for non-system tables
        #[arg(short, long)]
        plugin_dir: Option<String>,
    },

    /// Generate a system module from a YAML field list
    FromSpec {
        /// Path to the module spec file
        #[arg(short, long)]
        spec: PathBuf,
    },

    /// Delete the generated module of a table
    Delete {
        /// Table whose module is removed
        #[arg(short, long)]
        table: String,

        /// Plugin directory name; inferred from the table name when omitted
        #[arg(short, long)]
        plugin_dir: Option<String>,
    },

    /// List tables available for generation
    Tables {
        /// Case-insensitive match on table name or comment
        #[arg(short, long)]
        filter: Option<String>,

        /// Only generated (true) or only not generated (false) tables
        #[arg(short, long)]
        generated: Option<bool>,
    },

    /// Print the menu tree and report structural problems
    MenuTree,

    /// List plugin modules found in the plugin output root
    Plugins,
}

type LiveGenerator = CodeGenerator<DieselSchemaSource, DieselMenuRepository>;

fn connect(config: GeneratorConfig) -> Result<LiveGenerator, GeneratorError> {
    let db = Database::new_with_config(config.database_url()?, &config.database)?;
    db.test_connection()?;
    println!("  ✓ Connected to database");
    Ok(CodeGenerator::new(
        config,
        DieselSchemaSource::new(db.clone()),
        DieselMenuRepository::new(db),
    ))
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = GeneratorConfig::load(&cli.config).and_then(|config| match cli.command {
        Commands::Generate { table, plugin_dir } => generate(config, &table, plugin_dir.as_deref()),
        Commands::FromSpec { spec } => from_spec(config, spec),
        Commands::Delete { table, plugin_dir } => delete(config, &table, plugin_dir.as_deref()),
        Commands::Tables { filter, generated } => tables(config, filter, generated),
        Commands::MenuTree => menu_tree(config),
        Commands::Plugins => plugins(config),
    });

    if let Err(e) = result {
        let kind = if e.is_client_error() { "client" } else { "server" };
        eprintln!("Error ({} error): {}", kind, e);
        process::exit(1);
    }
}

fn status_marker(status: WriteStatus) -> &'static str {
    match status {
        WriteStatus::Created => "+",
        WriteStatus::Updated => "~",
        WriteStatus::Unchanged => "=",
    }
}

fn generate(config: GeneratorConfig, table: &str, plugin_dir: Option<&str>) -> Result<(), GeneratorError> {
    println!("🔧 Generating module for table {}...", table);
    let mut generator = connect(config)?;
    let report = generator.generate(table, plugin_dir)?;

    for file in &report.files {
        println!("  {} {}", status_marker(file.status), file.path.display());
    }
    if let Some(menu) = &report.menu {
        println!(
            "  ✓ Menus: {} created, {} updated, {} unchanged",
            menu.created, menu.updated, menu.unchanged
        );
    } else if report.identity.scope == Scope::System {
        println!("  ℹ System module: menus are not synchronized");
    }
    println!(
        "✅ Module '{}' ready ({} file(s) changed)",
        report.identity.module_name,
        report.changed_files()
    );
    Ok(())
}

fn from_spec(config: GeneratorConfig, spec: PathBuf) -> Result<(), GeneratorError> {
    println!("🔧 Generating module from {}...", spec.display());
    let spec = ModuleSpec::from_file(&spec)?;
    println!("  ✓ Loaded spec with {} field(s)", spec.fields.len());

    // Hand-written modules need neither the catalog nor the menu table.
    let mut generator = CodeGenerator::new(config, InMemorySchema::new(), InMemoryMenuRepository::new());
    let report = generator.generate_from_spec(&spec)?;

    for file in &report.files {
        println!("  {} {}", status_marker(file.status), file.path.display());
    }
    println!("✅ Module '{}' ready", report.identity.module_name);
    Ok(())
}

fn delete(config: GeneratorConfig, table: &str, plugin_dir: Option<&str>) -> Result<(), GeneratorError> {
    println!("🗑  Deleting module for table {}...", table);
    let mut generator = connect(config)?;
    let report = generator.delete_generated(table, plugin_dir)?;

    for path in &report.removed_paths {
        println!("  - {}", path.display());
    }
    if !report.removed_menu_ids.is_empty() {
        println!("  ✓ Removed {} menu node(s)", report.removed_menu_ids.len());
    }
    println!("✅ Module '{}' removed", report.identity.module_name);
    Ok(())
}

fn tables(config: GeneratorConfig, search: Option<String>, generated: Option<bool>) -> Result<(), GeneratorError> {
    let generator = connect(config)?;
    let filter = TableFilter {
        search,
        is_generated: generated,
    };

    let tables = generator.list_tables(&filter)?;
    for table in &tables {
        let marker = if table.is_generated { "✓" } else { " " };
        println!("  [{}] {:<32} {}", marker, table.table_name, table.table_comment);
    }
    println!("{} table(s)", tables.len());
    Ok(())
}

fn menu_tree(config: GeneratorConfig) -> Result<(), GeneratorError> {
    let mut generator = connect(config)?;
    let tree = generator.menu_tree()?;

    print!("{}", tree.render());
    if tree.is_valid() {
        println!("✅ {} node(s), no problems found", tree.len());
    } else {
        for violation in tree.violations() {
            println!("  ⚠ {:?}", violation);
        }
    }
    Ok(())
}

fn plugins(config: GeneratorConfig) -> Result<(), GeneratorError> {
    let root = config.scope_root(Scope::Plugin);
    println!("🔍 Scanning {}...", root.display());
    let registry = PluginRegistry::discover(&root)?;

    for entry in registry.iter() {
        let marker = match entry.status {
            PluginStatus::Ready => "✓",
            PluginStatus::MissingExport => "⚠",
        };
        println!("  {} {:<24} {}", marker, entry.module_name, entry.class_name);
    }
    for name in registry.disabled() {
        println!("  ℹ {} (disabled)", name);
    }
    println!("{} plugin(s) registered", registry.len());
    Ok(())
}
