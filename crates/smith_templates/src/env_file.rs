//! Generated `.env` file.
//!
//! Line order: one line per `credentials` entry, then provider extras, then
//! one line per `settings` entry. Keys are upper-cased. Mappings and
//! sequences are written as single-line JSON; other values in plain form,
//! with booleans spelled `True`/`False` for the Python servers that read them.
//! Values are not quoted or escaped, so a value containing a newline will
//! break the file for dotenv loaders.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ENV_FILE;
use crate::error::{GenerationStep, SmithError, SmithResult};
use crate::payload::{Configuration, CREDENTIALS_KEY, SETTINGS_KEY};
use crate::provider::ProviderRegistry;

/// One `KEY=value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLine {
    pub key: String,
    pub value: String,
}

impl EnvLine {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn from_entry(key: &str, value: &Value) -> Self {
        Self::new(key.to_uppercase(), plain_value(value))
    }
}

impl fmt::Display for EnvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Writes the environment file for a generated project.
#[derive(Debug, Clone, Default)]
pub struct EnvEmitter {
    providers: ProviderRegistry,
}

impl EnvEmitter {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self { providers }
    }

    /// Lines that `write_env` would write for `config`.
    pub fn env_lines(&self, config: &Configuration) -> Vec<EnvLine> {
        let mut lines = Vec::new();

        match config.get(CREDENTIALS_KEY) {
            Some(Value::Object(credentials)) => lines.extend(entries(credentials)),
            Some(_) => warn!("Ignoring non-mapping '{}' value", CREDENTIALS_KEY),
            None => {}
        }

        lines.extend(self.providers.extra_env_lines(config));

        match config.get(SETTINGS_KEY) {
            Some(Value::Object(settings)) => lines.extend(entries(settings)),
            Some(_) => warn!("Ignoring non-mapping '{}' value", SETTINGS_KEY),
            None => {}
        }

        lines
    }

    /// Create or overwrite `.env` at the root of `output_path`.
    pub fn write_env(&self, output_path: &Path, config: &Configuration) -> SmithResult<PathBuf> {
        let env_path = output_path.join(ENV_FILE);
        let lines = self.env_lines(config);

        let mut content = String::new();
        for line in &lines {
            content.push_str(&line.to_string());
            content.push('\n');
        }

        fs::write(&env_path, content)
            .map_err(|e| SmithError::io(GenerationStep::EmitEnv, output_path, &env_path, e))?;

        debug!(
            "Wrote {} line(s) to {:?}: {}",
            lines.len(),
            env_path,
            lines.iter().map(|l| l.key.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(env_path)
    }
}

fn entries(map: &Map<String, Value>) -> impl Iterator<Item = EnvLine> + '_ {
    map.iter().map(|(key, value)| EnvLine::from_entry(key, value))
}

/// Plain string form of a configuration value.
fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => to_json_line(value),
    }
}

/// Serialize `value` as single-line JSON with `", "` and `": "` separators
/// and non-ASCII characters escaped as `\uXXXX`.
pub fn to_json_line(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    // Writing a `Value` into a Vec cannot fail.
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
