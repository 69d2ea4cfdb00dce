//! Generation pipeline.
//!
//! `generate` runs resolve → validate → prepare → copy/render → emit-env.
//! Resolution and validation fail before the filesystem is touched. Later
//! steps are not transactional: a failure reports the output directory so
//! the caller can discard it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::copier::{CopyReport, TreeCopier};
use crate::env_file::EnvEmitter;
use crate::error::{GenerationStep, SmithError, SmithResult};
use crate::payload::Configuration;
use crate::provider::ProviderRegistry;
use crate::resolver::{Template, TemplateResolver};
use crate::schema::{SchemaReport, SchemaValidator};

/// A completed generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub id: Uuid,
    pub template: String,
    /// Absolute path of the populated output directory.
    pub path: PathBuf,
    /// Files copied verbatim, relative to `path`.
    pub copied: Vec<PathBuf>,
    /// Files produced by the renderer, relative to `path`.
    pub rendered: Vec<PathBuf>,
    pub env_file: PathBuf,
    pub generated_at: DateTime<Utc>,
}

/// Turns a template plus a configuration into a server project directory.
pub struct Generator {
    config: EngineConfig,
    resolver: TemplateResolver,
    validator: SchemaValidator,
    copier: TreeCopier,
    emitter: EnvEmitter,
}

impl Generator {
    pub fn new(config: EngineConfig) -> SmithResult<Self> {
        Ok(Self {
            resolver: TemplateResolver::new(config.templates_root.clone()),
            validator: SchemaValidator::from_config(&config),
            copier: TreeCopier::new(&config)?,
            emitter: EnvEmitter::default(),
            config,
        })
    }

    /// Replace the provider registry consulted for extra environment lines.
    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.emitter = EnvEmitter::new(providers);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    /// Resolve `template_name` and check `config` against its schema.
    pub fn check(&self, template_name: &str, config: &Configuration) -> SmithResult<SchemaReport> {
        let template = self.resolver.resolve(template_name)?;
        Ok(self.validator.check(&template.root_path, config))
    }

    /// Generate a project from `template_name`.
    ///
    /// Without `output_dir` a fresh directory named after the template is
    /// allocated under the temp root. A supplied directory is created if
    /// missing and reused otherwise; colliding files are overwritten.
    pub fn generate(
        &self,
        template_name: &str,
        config: &Configuration,
        output_dir: Option<&Path>,
    ) -> SmithResult<GenerationOutput> {
        let id = Uuid::new_v4();
        let span = info_span!("generate", %id, template = template_name);
        let _enter = span.enter();

        info!("Resolving template '{}'", template_name);
        let template = self.resolver.resolve(template_name)?;

        let report = self.validator.check(&template.root_path, config);
        if !report.valid {
            error!("Configuration rejected: {}", report.errors.join("; "));
            return Err(SmithError::InvalidConfiguration {
                template: template.name,
                reasons: report.errors,
            });
        }

        let (output, created) = self.prepare_output(&template, output_dir)?;
        info!("Generating into {:?}", output);

        let (copy_report, env_file) = match self.populate(&template, &output, config) {
            Ok(result) => result,
            Err(e) => {
                self.discard(&output, created);
                return Err(e);
            }
        };

        info!("Generated MCP server at {:?}", output);
        Ok(GenerationOutput {
            id,
            template: template.name,
            path: output,
            copied: copy_report.copied,
            rendered: copy_report.rendered,
            env_file,
            generated_at: Utc::now(),
        })
    }

    /// Returns the absolute output path and whether this call created it.
    fn prepare_output(
        &self,
        template: &Template,
        output_dir: Option<&Path>,
    ) -> SmithResult<(PathBuf, bool)> {
        let prepare_err =
            |path: &Path, e| SmithError::io(GenerationStep::Prepare, path, path, e);

        let path = match output_dir {
            None => {
                let root = self.config.temp_root.clone().unwrap_or_else(env::temp_dir);
                let prefix = format!("{}{}_", self.config.temp_prefix, template.name);
                let dir = tempfile::Builder::new()
                    .prefix(&prefix)
                    .tempdir_in(&root)
                    .map_err(|e| prepare_err(&root, e))?;
                return absolute(dir.keep()).map(|p| (p, true));
            }
            Some(dir) => dir,
        };

        let created = !path.exists();
        fs::create_dir_all(path).map_err(|e| prepare_err(path, e))?;
        absolute(path.to_path_buf()).map(|p| (p, created))
    }

    fn populate(
        &self,
        template: &Template,
        output: &Path,
        config: &Configuration,
    ) -> SmithResult<(CopyReport, PathBuf)> {
        info!("Copying template tree from {:?}", template.root_path);
        let copy_report = self.copier.copy_tree(&template.root_path, output, config)?;

        info!("Writing environment file");
        let env_file = self.emitter.write_env(output, config)?;

        Ok((copy_report, env_file))
    }

    fn discard(&self, output: &Path, created: bool) {
        if !(self.config.cleanup_on_failure && created) {
            warn!("Generation failed; {:?} may be partially populated", output);
            return;
        }
        match fs::remove_dir_all(output) {
            Ok(()) => info!("Removed partial output {:?}", output),
            Err(e) => warn!("Could not remove partial output {:?}: {}", output, e),
        }
    }
}

fn absolute(path: PathBuf) -> SmithResult<PathBuf> {
    fs::canonicalize(&path).map_err(|e| SmithError::io(GenerationStep::Prepare, &path, &path, e))
}
