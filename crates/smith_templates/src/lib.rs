//! # smith_templates
//!
//! Template-based generation engine for mcpsmith.
//!
//! Given a template name and a configuration payload, the engine:
//!
//! - resolves the template directory under a templates root
//! - checks the configuration against the template's `config_schema.json`
//! - copies the template tree into a fresh output directory, rendering
//!   root-level source files with the configuration
//! - writes a `.env` file with the credentials and settings
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use smith_templates::{Configuration, EngineConfig, Generator};
//!
//! let generator = Generator::new(EngineConfig::new("templates")).unwrap();
//! let config = Configuration::from_value(json!({
//!     "service_name": "deepsearch",
//!     "credentials": {"api_key": "jina_..."}
//! }))
//! .unwrap();
//!
//! let output = generator.generate("fastmcp_base", &config, None).unwrap();
//! println!("generated at {}", output.path.display());
//! ```

pub mod config;
pub mod copier;
pub mod env_file;
pub mod error;
pub mod generator;
pub mod loader;
pub mod manifest;
pub mod payload;
pub mod provider;
pub mod renderer;
pub mod resolver;
pub mod schema;

pub use config::{EngineConfig, ENV_FILE, MANIFEST_FILE, SCHEMA_FILE};
pub use copier::{CopyReport, TreeCopier};
pub use env_file::{to_json_line, EnvEmitter, EnvLine};
pub use error::{GenerationStep, SmithError, SmithResult};
pub use generator::{GenerationOutput, Generator};
pub use loader::TemplateLoader;
pub use manifest::{TemplateCatalog, TemplateCategory, TemplateEntry, TemplateManifest};
pub use payload::Configuration;
pub use provider::{Provider, ProviderRegistry};
pub use renderer::TemplateRenderer;
pub use resolver::{Template, TemplateResolver};
pub use schema::{ConfigSchema, SchemaReport, SchemaValidator};
