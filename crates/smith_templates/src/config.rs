//! Engine settings.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SmithError, SmithResult};

/// Name of the schema file a template may carry.
pub const SCHEMA_FILE: &str = "config_schema.json";
/// Name of the optional catalog manifest a template may carry.
pub const MANIFEST_FILE: &str = "template.yaml";
/// Name of the generated environment file.
pub const ENV_FILE: &str = ".env";

/// Generation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base directory holding one subdirectory per template.
    pub templates_root: PathBuf,
    /// Reject every configuration for templates without a schema file.
    pub strict_schema: bool,
    /// Also apply the schema file as a full JSON Schema.
    pub type_check: bool,
    /// Extensions of root-level files handed to the renderer.
    pub render_extensions: Vec<String>,
    /// Generation metadata skipped at the template root.
    pub metadata_files: Vec<String>,
    /// Cache/build artifacts skipped at every depth (glob patterns).
    pub ignore_patterns: Vec<String>,
    /// Prefix of engine-allocated output directories.
    pub temp_prefix: String,
    /// Parent of engine-allocated output directories (system temp dir if unset).
    pub temp_root: Option<PathBuf>,
    /// Delete output directories created by a failed call.
    pub cleanup_on_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            templates_root: PathBuf::from("templates"),
            strict_schema: false,
            type_check: false,
            render_extensions: vec!["py".to_string()],
            metadata_files: vec![SCHEMA_FILE.to_string(), MANIFEST_FILE.to_string()],
            ignore_patterns: vec![
                "__pycache__".to_string(),
                ".pytest_cache".to_string(),
                ".mypy_cache".to_string(),
                ".ruff_cache".to_string(),
                "*.pyc".to_string(),
            ],
            temp_prefix: "mcp_server_".to_string(),
            temp_root: None,
            cleanup_on_failure: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EngineFile {
    #[serde(default)]
    engine: EngineConfig,
}

impl EngineConfig {
    pub fn new(templates_root: impl Into<PathBuf>) -> Self {
        Self {
            templates_root: templates_root.into(),
            ..Self::default()
        }
    }

    /// Load settings from a TOML file with an `[engine]` table.
    pub fn load(path: &Path) -> SmithResult<Self> {
        debug!("Loading engine config from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SmithResult<Self> {
        let file: EngineFile = toml::from_str(content)?;
        file.engine.ignore_set()?;
        Ok(file.engine)
    }

    pub fn templates_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.templates_root = root.into();
        self
    }

    pub fn strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    pub fn type_check(mut self, enabled: bool) -> Self {
        self.type_check = enabled;
        self
    }

    pub fn render_extension(mut self, ext: impl Into<String>) -> Self {
        self.render_extensions.push(ext.into());
        self
    }

    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_patterns.push(pattern.into());
        self
    }

    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn cleanup_on_failure(mut self, cleanup: bool) -> Self {
        self.cleanup_on_failure = cleanup;
        self
    }

    /// Compile `ignore_patterns`.
    pub fn ignore_set(&self) -> SmithResult<IgnoreSet> {
        let patterns = self
            .ignore_patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| SmithError::Config(format!("invalid ignore pattern '{}': {}", p, e)))
            })
            .collect::<SmithResult<Vec<_>>>()?;
        Ok(IgnoreSet { patterns })
    }
}

/// Compiled cache/build-artifact patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }
}
