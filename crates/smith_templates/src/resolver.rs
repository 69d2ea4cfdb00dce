//! Template resolution.
//!
//! Maps a template name to its directory under the templates root. The
//! resolver never writes; templates are shared read-only between requests.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::{MANIFEST_FILE, SCHEMA_FILE};
use crate::error::{SmithError, SmithResult};

/// A template located on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Template name, identical to its directory name.
    pub name: String,
    /// Directory holding the template files.
    pub root_path: PathBuf,
}

impl Template {
    pub fn schema_path(&self) -> PathBuf {
        self.root_path.join(SCHEMA_FILE)
    }

    pub fn has_schema(&self) -> bool {
        self.schema_path().is_file()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_path.join(MANIFEST_FILE)
    }
}

/// Resolves template names against a templates root.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    templates_root: PathBuf,
}

impl TemplateResolver {
    pub fn new(templates_root: impl Into<PathBuf>) -> Self {
        Self {
            templates_root: templates_root.into(),
        }
    }

    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    /// Locate `template_name` under the templates root.
    pub fn resolve(&self, template_name: &str) -> SmithResult<Template> {
        if !is_plain_name(template_name) {
            debug!("Rejecting template name {:?}", template_name);
            return Err(SmithError::TemplateNotFound(template_name.to_string()));
        }

        let root_path = self.templates_root.join(template_name);
        if !root_path.is_dir() {
            debug!("Template directory does not exist: {:?}", root_path);
            return Err(SmithError::TemplateNotFound(template_name.to_string()));
        }

        debug!("Resolved template '{}' to {:?}", template_name, root_path);
        Ok(Template {
            name: template_name.to_string(),
            root_path,
        })
    }

    /// Whether `template_name` resolves.
    pub fn exists(&self, template_name: &str) -> bool {
        self.resolve(template_name).is_ok()
    }
}

/// A name that denotes exactly one directory directly under the root.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
