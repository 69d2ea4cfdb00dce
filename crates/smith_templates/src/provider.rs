//! Provider-specific environment extensions.
//!
//! The emitter writes credentials and settings generically. Providers whose
//! generated servers expect something extra contribute additional lines,
//! selected from the configuration's declared `type`.

use std::fmt;

use serde_json::{Map, Value};

use crate::env_file::{to_json_line, EnvLine};
use crate::payload::Configuration;

/// Known providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Google Drive servers load their OAuth payload from `GOOGLE_CREDENTIALS`.
    GoogleDrive,
}

impl Provider {
    pub fn id(&self) -> &'static str {
        match self {
            Provider::GoogleDrive => "google_drive",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Provider::GoogleDrive]
    }

    /// Whether a configuration `type` selects this provider.
    pub fn matches(&self, config_type: &str) -> bool {
        config_type.contains(self.id())
    }

    /// Extra environment lines for this provider.
    pub fn extra_env_lines(&self, credentials: &Map<String, Value>) -> Vec<EnvLine> {
        match self {
            Provider::GoogleDrive => vec![EnvLine::new(
                "GOOGLE_CREDENTIALS",
                format!("'{}'", to_json_line(&Value::Object(credentials.clone()))),
            )],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Ordered set of providers consulted by the emitter.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRegistry {
    /// Registry with every known provider.
    pub fn builtin() -> Self {
        Self {
            providers: Provider::all(),
        }
    }

    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with(mut self, provider: Provider) -> Self {
        if !self.providers.contains(&provider) {
            self.providers.push(provider);
        }
        self
    }

    /// Providers selected by `config`.
    pub fn select(&self, config: &Configuration) -> Vec<Provider> {
        let config_type = config.provider_type();
        self.providers
            .iter()
            .copied()
            .filter(|p| p.matches(config_type))
            .collect()
    }

    /// Extra lines from every selected provider. Requires a `credentials` mapping.
    pub fn extra_env_lines(&self, config: &Configuration) -> Vec<EnvLine> {
        let Some(credentials) = config.credentials() else {
            return Vec::new();
        };
        self.select(config)
            .into_iter()
            .flat_map(|p| p.extra_env_lines(credentials))
            .collect()
    }
}
