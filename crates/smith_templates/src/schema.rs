//! Configuration schema loading and validation.
//!
//! A template may declare a `config_schema.json` with two levels of
//! presence checks:
//!
//! ```json
//! {
//!   "required": ["doc_url"],
//!   "properties": { "credentials": { "required": ["api_key"] } }
//! }
//! ```
//!
//! A missing schema file accepts any configuration unless the validator is
//! strict. A schema file that cannot be parsed rejects every configuration.

use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::{EngineConfig, SCHEMA_FILE};
use crate::payload::{json_kind, Configuration, CREDENTIALS_KEY};

/// Presence requirements declared by a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSchema {
    /// Keys required at the top level of the configuration.
    pub required: Vec<String>,
    /// Keys required under `credentials`.
    pub required_credentials: Vec<String>,
    /// The parsed schema document, kept for JSON Schema type checking.
    pub raw: Value,
}

impl ConfigSchema {
    /// Interpret a parsed schema document.
    pub fn from_value(raw: Value) -> Result<Self, String> {
        let root = raw
            .as_object()
            .ok_or_else(|| format!("schema root must be an object, got {}", json_kind(&raw)))?;

        let required = string_list(root.get("required"), "required")?;

        let credentials = match root.get("properties") {
            None => None,
            Some(Value::Object(props)) => props.get(CREDENTIALS_KEY),
            Some(other) => {
                return Err(format!(
                    "'properties' must be an object, got {}",
                    json_kind(other)
                ))
            }
        };
        let required_credentials = match credentials {
            None => Vec::new(),
            Some(Value::Object(creds)) => {
                string_list(creds.get("required"), "properties.credentials.required")?
            }
            Some(other) => {
                return Err(format!(
                    "'properties.credentials' must be an object, got {}",
                    json_kind(other)
                ))
            }
        };

        Ok(Self {
            required,
            required_credentials,
            raw,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let raw: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        Self::from_value(raw)
    }
}

fn string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>, String> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| format!("'{}' entries must be strings", field))
            })
            .collect(),
        Some(other) => Err(format!(
            "'{}' must be an array, got {}",
            field,
            json_kind(other)
        )),
    }
}

/// Outcome of checking a configuration against a template schema.
#[derive(Debug, Default)]
pub struct SchemaReport {
    pub valid: bool,
    pub schema_present: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SchemaReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Checks configurations against a template's `config_schema.json`.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    strict: bool,
    type_check: bool,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            strict: config.strict_schema,
            type_check: config.type_check,
        }
    }

    /// Reject configurations for templates that ship no schema.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Also run the schema document as a full JSON Schema.
    pub fn type_check(mut self, enabled: bool) -> Self {
        self.type_check = enabled;
        self
    }

    /// Whether `config` satisfies the schema of the template at `template_path`.
    pub fn validate(&self, template_path: &Path, config: &Configuration) -> bool {
        self.check(template_path, config).valid
    }

    /// Check `config` and report every problem found.
    pub fn check(&self, template_path: &Path, config: &Configuration) -> SchemaReport {
        let mut report = SchemaReport::new();
        let schema_path = template_path.join(SCHEMA_FILE);

        if !schema_path.is_file() {
            if self.strict {
                error!("No schema found at {:?} and strict schema mode is on", schema_path);
                report.add_error(format!("Template has no {}", SCHEMA_FILE));
            } else {
                warn!("No schema found at {:?}", schema_path);
                report.add_warning(format!("Template has no {}; accepting any configuration", SCHEMA_FILE));
            }
            return report;
        }
        report.schema_present = true;

        let schema = match fs::read_to_string(&schema_path)
            .map_err(|e| e.to_string())
            .and_then(|content| ConfigSchema::from_json_str(&content))
        {
            Ok(schema) => schema,
            Err(e) => {
                error!("Error loading schema {:?}: {}", schema_path, e);
                report.add_error(format!("Unreadable {}: {}", SCHEMA_FILE, e));
                return report;
            }
        };

        self.check_presence(&schema, config, &mut report);
        if self.type_check {
            check_types(&schema, config, &mut report);
        }

        debug!(
            "Schema check for {:?}: {} error(s)",
            template_path,
            report.errors.len()
        );
        report
    }

    fn check_presence(&self, schema: &ConfigSchema, config: &Configuration, report: &mut SchemaReport) {
        for field in &schema.required {
            if !config.contains_key(field) {
                error!("Missing required field: {}", field);
                report.add_error(format!("Missing required field: {}", field));
            }
        }

        let credentials = config.credentials();
        for field in &schema.required_credentials {
            if !credentials.is_some_and(|c| c.contains_key(field)) {
                error!("Missing required credential: {}", field);
                report.add_error(format!("Missing required credential: {}", field));
            }
        }
    }
}

fn check_types(schema: &ConfigSchema, config: &Configuration, report: &mut SchemaReport) {
    let compiled = match JSONSchema::compile(&schema.raw) {
        Ok(compiled) => compiled,
        Err(e) => {
            report.add_error(format!("{} is not a valid JSON Schema: {}", SCHEMA_FILE, e));
            return;
        }
    };

    let instance = Value::Object(config.as_map().clone());
    let result = compiled.validate(&instance);
    if let Err(errors) = result {
        for e in errors {
            let message = format!("Schema violation at '{}': {}", e.instance_path, e);
            if !report.errors.contains(&message) {
                report.add_error(message);
            }
        }
    }
}
