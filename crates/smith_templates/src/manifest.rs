//! Template catalog metadata.
//!
//! A template directory may carry a `template.yaml` describing it for
//! listings. Generation never reads it; it is skipped during copy like the
//! schema file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Template category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    /// Wraps an external data source (drive, search index, ...)
    DataSource,
    /// Exposes actions against an external API
    Tool,
    #[default]
    Custom,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::DataSource => "data-source",
            TemplateCategory::Tool => "tool",
            TemplateCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Contents of `template.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateManifest {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default = "default_version")]
    pub version: String,
    /// Generated servers need review before deployment
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for TemplateManifest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            category: TemplateCategory::default(),
            version: default_version(),
            requires_approval: false,
            tags: Vec::new(),
        }
    }
}

/// One discovered template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateEntry {
    /// Directory name, used as the template name in generation requests.
    pub id: String,
    pub path: PathBuf,
    pub has_schema: bool,
    /// Parsed manifest, or defaults when the template ships none.
    pub manifest: TemplateManifest,
}

impl TemplateEntry {
    pub fn display_name(&self) -> &str {
        self.manifest.name.as_deref().unwrap_or(&self.id)
    }
}

/// Templates available under a templates root.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, TemplateEntry>,
    templates_path: PathBuf,
}

impl TemplateCatalog {
    pub fn new(templates_path: PathBuf) -> Self {
        Self {
            templates: BTreeMap::new(),
            templates_path,
        }
    }

    pub fn register(&mut self, entry: TemplateEntry) {
        self.templates.insert(entry.id.clone(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&TemplateEntry> {
        self.templates.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// All templates, ordered by id.
    pub fn list(&self) -> Vec<&TemplateEntry> {
        self.templates.values().collect()
    }

    pub fn by_category(&self, category: TemplateCategory) -> Vec<&TemplateEntry> {
        self.templates
            .values()
            .filter(|t| t.manifest.category == category)
            .collect()
    }

    pub fn templates_path(&self) -> &PathBuf {
        &self.templates_path
    }
}
