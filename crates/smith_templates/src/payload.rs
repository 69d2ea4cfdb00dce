//! Caller-supplied configuration payload.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SmithError, SmithResult};

/// Key holding secrets and tokens.
pub const CREDENTIALS_KEY: &str = "credentials";
/// Key holding non-secret runtime settings.
pub const SETTINGS_KEY: &str = "settings";
/// Key naming the provider flavour of the request.
pub const TYPE_KEY: &str = "type";

/// Arbitrarily nested key/value mapping for one generation request.
///
/// By convention it carries a `credentials` sub-mapping, an optional
/// `settings` sub-mapping and a `type` string. The engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> SmithResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SmithError::Config(format!(
                "configuration must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_json_str(content: &str) -> SmithResult<Self> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Read a configuration payload from a JSON file.
    pub fn load(path: &Path) -> SmithResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `credentials` sub-mapping, if present and a mapping.
    pub fn credentials(&self) -> Option<&Map<String, Value>> {
        self.0.get(CREDENTIALS_KEY).and_then(Value::as_object)
    }

    /// The `settings` sub-mapping, if present and a mapping.
    pub fn settings(&self) -> Option<&Map<String, Value>> {
        self.0.get(SETTINGS_KEY).and_then(Value::as_object)
    }

    /// The declared provider type, or `""` when absent or not a string.
    pub fn provider_type(&self) -> &str {
        self.0.get(TYPE_KEY).and_then(Value::as_str).unwrap_or("")
    }
}

impl From<Map<String, Value>> for Configuration {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Configuration {
    type Error = SmithError;

    fn try_from(value: Value) -> SmithResult<Self> {
        Self::from_value(value)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
