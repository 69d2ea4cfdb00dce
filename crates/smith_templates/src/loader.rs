//! Template discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{MANIFEST_FILE, SCHEMA_FILE};
use crate::error::{SmithError, SmithResult};
use crate::manifest::{TemplateCatalog, TemplateEntry, TemplateManifest};
use crate::schema::ConfigSchema;

/// Discovers templates under a templates root.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    /// Load every template directory under the root.
    ///
    /// Directories with an unreadable manifest are skipped with a warning.
    pub fn load_all(&self) -> SmithResult<TemplateCatalog> {
        let mut catalog = TemplateCatalog::new(self.templates_path.clone());

        if !self.templates_path.exists() {
            warn!("Templates directory does not exist: {:?}", self.templates_path);
            return Ok(catalog);
        }

        for entry in WalkDir::new(&self.templates_path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_dir() || entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            match self.load_template(path) {
                Ok(template) => {
                    info!("Loaded template: {} ({})", template.display_name(), template.id);
                    catalog.register(template);
                }
                Err(e) => {
                    warn!("Failed to load template from {:?}: {}", path, e);
                }
            }
        }

        Ok(catalog)
    }

    /// Load a single template directory.
    pub fn load_template(&self, path: &Path) -> SmithResult<TemplateEntry> {
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SmithError::TemplateNotFound(path.display().to_string()))?;

        let manifest_path = path.join(MANIFEST_FILE);
        let manifest = if manifest_path.is_file() {
            debug!("Loading manifest from {:?}", manifest_path);
            let content = fs::read_to_string(&manifest_path)?;
            serde_yaml::from_str(&content)?
        } else {
            TemplateManifest::default()
        };

        Ok(TemplateEntry {
            id,
            path: path.to_path_buf(),
            has_schema: path.join(SCHEMA_FILE).is_file(),
            manifest,
        })
    }

    /// Report problems with a template directory that would surface at generation time.
    pub fn validate_template(&self, path: &Path) -> SmithResult<Vec<String>> {
        let mut issues = Vec::new();

        if !path.is_dir() {
            issues.push(format!("Not a directory: {}", path.display()));
            return Ok(issues);
        }

        let schema_path = path.join(SCHEMA_FILE);
        if schema_path.is_file() {
            let content = fs::read_to_string(&schema_path)?;
            if let Err(e) = ConfigSchema::from_json_str(&content) {
                issues.push(format!("Invalid {}: {}", SCHEMA_FILE, e));
            }
        }

        let manifest_path = path.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let content = fs::read_to_string(&manifest_path)?;
            if let Err(e) = serde_yaml::from_str::<TemplateManifest>(&content) {
                issues.push(format!("Invalid {}: {}", MANIFEST_FILE, e));
            }
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::TemplateCategory;
    use tempfile::tempdir;

    #[test]
    fn test_loader_empty_dir() {
        let temp = tempdir().unwrap();
        let loader = TemplateLoader::new(temp.path());
        let catalog = loader.load_all().unwrap();
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn test_loader_missing_dir() {
        let temp = tempdir().unwrap();
        let loader = TemplateLoader::new(temp.path().join("nope"));
        assert!(loader.load_all().unwrap().list().is_empty());
    }

    #[test]
    fn test_loader_discovers_templates() {
        let temp = tempdir().unwrap();
        let drive = temp.path().join("google_drive");
        fs::create_dir_all(&drive).unwrap();
        fs::write(drive.join(MANIFEST_FILE), "name: Google Drive\ncategory: data-source\n").unwrap();
        fs::write(drive.join(SCHEMA_FILE), r#"{"required": ["credentials"]}"#).unwrap();
        fs::create_dir_all(temp.path().join("bare")).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join("README.md"), "templates").unwrap();

        let catalog = TemplateLoader::new(temp.path()).load_all().unwrap();

        assert_eq!(catalog.list().len(), 2);
        let entry = catalog.get("google_drive").unwrap();
        assert_eq!(entry.display_name(), "Google Drive");
        assert_eq!(entry.manifest.category, TemplateCategory::DataSource);
        assert!(entry.has_schema);
        assert!(!catalog.get("bare").unwrap().has_schema);
    }

    #[test]
    fn test_validate_template_reports_bad_schema() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(SCHEMA_FILE), r#"{"required": "doc_url"}"#).unwrap();

        let issues = TemplateLoader::new(temp.path()).validate_template(temp.path()).unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("must be an array"));
    }
}
