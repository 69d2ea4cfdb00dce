//! Error types for template generation.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for generation operations.
pub type SmithResult<T> = Result<T, SmithError>;

/// Pipeline step a generation failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    Resolve,
    Validate,
    Prepare,
    Copy,
    EmitEnv,
}

impl GenerationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStep::Resolve => "resolve",
            GenerationStep::Validate => "validate",
            GenerationStep::Prepare => "prepare",
            GenerationStep::Copy => "copy",
            GenerationStep::EmitEnv => "emit-env",
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while generating a server project.
#[derive(Error, Debug)]
pub enum SmithError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid configuration for template {template}: {}", reasons.join("; "))]
    InvalidConfiguration {
        template: String,
        reasons: Vec<String>,
    },

    #[error("Generation failed during {step} at {}: {source}", path.display())]
    GenerationIo {
        step: GenerationStep,
        /// Output directory, possibly partially populated.
        output: PathBuf,
        /// File or directory the failing operation touched.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template rendering failed for {}: {source}", path.display())]
    Render {
        output: PathBuf,
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("Engine configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SmithError {
    pub(crate) fn io(
        step: GenerationStep,
        output: &Path,
        path: &Path,
        source: std::io::Error,
    ) -> Self {
        SmithError::GenerationIo {
            step,
            output: output.to_path_buf(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Output directory left behind by a failure after the filesystem was touched.
    ///
    /// Callers should delete it wholesale and retry rather than resume. A
    /// failure while preparing the output directory reports `None`: the
    /// path in that error is the temp root or the caller's target, not a
    /// directory this generation populated.
    pub fn partial_output(&self) -> Option<&Path> {
        match self {
            SmithError::GenerationIo {
                step: GenerationStep::Prepare,
                ..
            } => None,
            SmithError::GenerationIo { output, .. } | SmithError::Render { output, .. } => {
                Some(output.as_path())
            }
            _ => None,
        }
    }

    /// True when the failure was detected before any filesystem mutation.
    ///
    /// Prepare failures are excluded since missing parents of a caller
    /// supplied output directory may already have been created.
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            SmithError::TemplateNotFound(_) | SmithError::InvalidConfiguration { .. }
        )
    }
}
