//! Application configuration.
//!
//! Resolution order, lowest to highest priority:
//! 1. `application.yaml`
//! 2. `application-{profile}.yaml`
//! 3. `.env`, then `.env.{profile}` (never overwriting set variables)
//! 4. environment variables (`BINDOC_DOCS_TITLE` overrides `bindoc.docs.title`)
//!
//! The profile comes from `BINDOC_PROFILE`, else the argument to
//! [`AppConfig::load`].

mod loader;
mod value;

use std::collections::HashMap;
use std::path::Path;

pub use value::{ConfigValue, FromConfigValue};

use crate::document::DEFAULT_TITLE;

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The key is not present.
    NotFound(String),
    /// The value does not convert to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// A file could not be read or parsed.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "BINDOC_PROFILE";

/// Flattened key-value configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl AppConfig {
    /// Load the configuration files of the working directory for `profile`.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());
        let mut values = HashMap::new();

        loader::load_yaml_file(Path::new("application.yaml"), &mut values)?;
        loader::load_yaml_file(Path::new(&format!("application-{profile}.yaml")), &mut values)?;

        // missing .env files are fine
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_filename(format!(".env.{profile}"));

        for (name, raw) in std::env::vars() {
            values.insert(loader::env_key(&name), ConfigValue::String(raw));
        }

        tracing::debug!(profile = %profile, keys = values.len(), "Configuration loaded");
        Ok(Self { values, profile })
    }

    /// Build a configuration from YAML text, without files or environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(Self {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Typed value of a dotted key.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Typed value, or `default` when the key is missing or mistyped.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

/// Where documents are served and how endpoints answer schema requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSettings {
    /// Query flag that makes any registered route return its endpoint record.
    pub schema_flag: String,
    pub title: String,
    pub markdown_path: String,
    pub html_path: String,
    pub schemas_path: String,
    /// Largest request body a registered handler reads, in bytes.
    pub body_limit: usize,
}

/// Body limit when none is configured, matching axum's `DefaultBodyLimit`.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

impl Default for DocSettings {
    fn default() -> Self {
        Self {
            schema_flag: "get_schema".to_string(),
            title: DEFAULT_TITLE.to_string(),
            markdown_path: "/apidoc.md".to_string(),
            html_path: "/apidoc.html".to_string(),
            schemas_path: "/apischema".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl DocSettings {
    /// Read the `bindoc.*` keys, keeping defaults for missing ones.
    pub fn from_config(config: &AppConfig) -> Self {
        let defaults = Self::default();
        Self {
            schema_flag: config.get_or("bindoc.schema.flag", defaults.schema_flag),
            title: config.get_or("bindoc.docs.title", defaults.title),
            markdown_path: config.get_or("bindoc.docs.markdown", defaults.markdown_path),
            html_path: config.get_or("bindoc.docs.html", defaults.html_path),
            schemas_path: config.get_or("bindoc.docs.schemas", defaults.schemas_path),
            body_limit: config.get_or("bindoc.body.limit", defaults.body_limit),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_schema_flag(mut self, flag: impl Into<String>) -> Self {
        self.schema_flag = flag.into();
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}
