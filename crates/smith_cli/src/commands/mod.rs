//! CLI command definitions.
//!
//! Each subcommand is a thin caller of the `smith_templates` engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use smith_templates::{Configuration, EngineConfig};

pub mod generate;
pub mod list;
pub mod validate;

/// Settings file picked up from the working directory.
const DEFAULT_ENGINE_CONFIG: &str = "smith.toml";

/// mcpsmith - generate MCP servers from templates
#[derive(Parser)]
#[command(name = "smith")]
#[command(version, about = "mcpsmith - generate MCP servers from templates")]
#[command(long_about = r#"
mcpsmith turns a template plus a JSON configuration payload into a runnable
MCP server project directory.

COMMANDS:
  generate  → Render a template into an output directory
  list      → Show the templates available under the templates root
  validate  → Check a configuration against a template schema

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Invalid configuration
  4 - Template error
  5 - Generation I/O failure

Generated directories contain plaintext secrets in .env.
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Templates root directory
    #[arg(long, global = true, env = "SMITH_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Engine settings file (TOML, `[engine]` table)
    #[arg(long, global = true, env = "SMITH_ENGINE_CONFIG")]
    pub engine_config: Option<PathBuf>,

    /// Reject configurations for templates without a schema
    #[arg(long, global = true)]
    pub strict_schema: bool,

    /// Also type-check configurations against the template JSON Schema
    #[arg(long, global = true)]
    pub type_check: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a server project from a template
    Generate(generate::GenerateArgs),

    /// List available templates
    List(list::ListArgs),

    /// Validate a configuration against a template schema
    Validate(validate::ValidateArgs),
}

impl Cli {
    /// Engine settings: file, then environment/flags.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let file = self.engine_config.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_ENGINE_CONFIG);
            default.is_file().then_some(default)
        });

        let mut config = match file {
            Some(path) => {
                debug!("Using engine settings from {:?}", path);
                EngineConfig::load(&path)
                    .with_context(|| format!("Failed to load engine settings {:?}", path))?
            }
            None => EngineConfig::default(),
        };

        if let Some(dir) = &self.templates_dir {
            config.templates_root = dir.clone();
        }
        if self.strict_schema {
            config.strict_schema = true;
        }
        if self.type_check {
            config.type_check = true;
        }
        Ok(config)
    }
}

/// Read a JSON configuration payload, `-` meaning stdin.
pub fn read_configuration(path: &Path) -> Result<Configuration> {
    if path == Path::new("-") {
        let value: serde_json::Value = serde_json::from_reader(std::io::stdin().lock())
            .context("Failed to parse configuration from stdin")?;
        return Ok(Configuration::from_value(value)?);
    }
    Configuration::load(path).with_context(|| format!("Failed to read configuration {:?}", path))
}
