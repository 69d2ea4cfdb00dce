//! Template tree copying.
//!
//! Only files at the template root are rendering candidates. Subdirectories
//! are copied byte-for-byte, whatever their contents.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{EngineConfig, IgnoreSet};
use crate::error::{GenerationStep, SmithError, SmithResult};
use crate::payload::Configuration;
use crate::renderer::TemplateRenderer;

/// Files written by a tree copy, relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    pub copied: Vec<PathBuf>,
    pub rendered: Vec<PathBuf>,
}

/// Copies a template directory into an output directory.
pub struct TreeCopier {
    renderer: TemplateRenderer,
    render_extensions: Vec<String>,
    metadata_files: Vec<String>,
    ignore: IgnoreSet,
}

impl TreeCopier {
    pub fn new(config: &EngineConfig) -> SmithResult<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new(),
            render_extensions: config.render_extensions.clone(),
            metadata_files: config.metadata_files.clone(),
            ignore: config.ignore_set()?,
        })
    }

    /// Copy `template_path` into `output_path`, rendering root-level source files.
    ///
    /// Existing files in `output_path` with colliding names are overwritten.
    /// A failure leaves whatever was already written in place.
    pub fn copy_tree(
        &self,
        template_path: &Path,
        output_path: &Path,
        config: &Configuration,
    ) -> SmithResult<CopyReport> {
        let mut report = CopyReport::default();
        let io_err = |path: &Path, e| SmithError::io(GenerationStep::Copy, output_path, path, e);

        let mut entries = fs::read_dir(template_path)
            .map_err(|e| io_err(template_path, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| io_err(template_path, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if self.metadata_files.iter().any(|m| *m == name) || self.ignore.matches(&name) {
                debug!("Skipping {:?}", entry.path());
                continue;
            }

            let source = entry.path();
            let dest = output_path.join(&*name);

            if source.is_dir() {
                self.copy_dir(&source, &dest, output_path, &mut report)?;
            } else if self.should_render(&source) {
                self.renderer.render(&source, &dest, config, output_path)?;
                report.rendered.push(PathBuf::from(&*name));
            } else {
                copy_file(&source, &dest).map_err(|e| io_err(&source, e))?;
                debug!("Copied: {:?}", dest);
                report.copied.push(PathBuf::from(&*name));
            }
        }

        info!(
            "Copied {} file(s), rendered {} file(s) into {:?}",
            report.copied.len(),
            report.rendered.len(),
            output_path
        );
        Ok(report)
    }

    /// Copy a subdirectory verbatim, minus cache/build artifacts.
    fn copy_dir(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        output_path: &Path,
        report: &mut CopyReport,
    ) -> SmithResult<()> {
        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.ignore.matches(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source_dir).to_path_buf();
                SmithError::io(GenerationStep::Copy, output_path, &path, e.into())
            })?;

            let source = entry.path();
            let relative = source.strip_prefix(source_dir).unwrap_or(source);
            let target = dest_dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|e| SmithError::io(GenerationStep::Copy, output_path, &target, e))?;
            } else {
                copy_file(source, &target)
                    .map_err(|e| SmithError::io(GenerationStep::Copy, output_path, source, e))?;
                let rel_out = target.strip_prefix(output_path).unwrap_or(&target);
                report.copied.push(rel_out.to_path_buf());
            }
        }

        debug!("Copied directory {:?} -> {:?}", source_dir, dest_dir);
        Ok(())
    }

    fn should_render(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.render_extensions.iter().any(|r| r == ext))
    }
}

/// Byte-identical copy keeping permissions and, where possible, mtime.
fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if dest.exists() {
        debug!("Overwriting existing file {:?}", dest);
    }
    fs::copy(source, dest)?;
    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    if let Err(e) = filetime::set_file_mtime(dest, mtime) {
        debug!("Could not preserve mtime of {:?}: {}", dest, e);
    }
    Ok(())
}
