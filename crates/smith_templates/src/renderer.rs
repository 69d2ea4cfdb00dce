//! Template rendering.

use std::fs;
use std::path::Path;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use tracing::debug;

use crate::error::{GenerationStep, SmithError, SmithResult};
use crate::payload::Configuration;

/// Renders templated source files with configuration values.
///
/// Every top-level configuration key is a template variable. Undefined
/// variables, and attributes of undefined values, render as empty text.
/// Output is source code, so nothing is HTML-escaped.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    /// Render template text against `config`.
    pub fn render_str(&self, source: &str, config: &Configuration) -> Result<String, minijinja::Error> {
        self.env.render_str(source, config.as_map())
    }

    /// Render `source_file` into `dest_file`, replacing it if present.
    ///
    /// `output` is the generation directory reported on failure.
    pub fn render(
        &self,
        source_file: &Path,
        dest_file: &Path,
        config: &Configuration,
        output: &Path,
    ) -> SmithResult<()> {
        let content = fs::read_to_string(source_file)
            .map_err(|e| SmithError::io(GenerationStep::Copy, output, source_file, e))?;

        let rendered = self
            .render_str(&content, config)
            .map_err(|source| SmithError::Render {
                output: output.to_path_buf(),
                path: source_file.to_path_buf(),
                source,
            })?;

        fs::write(dest_file, rendered)
            .map_err(|e| SmithError::io(GenerationStep::Copy, output, dest_file, e))?;
        debug!("Rendered: {:?}", dest_file);
        Ok(())
    }
}
