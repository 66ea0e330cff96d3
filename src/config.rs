//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.augur/config.toml` (user)
//! 3. `/etc/augur/config.toml` (system)
//!
//! When no file is found the built-in defaults are used. Credentials are
//! never read from the config file; see [`Credentials`].
//!
//! ```toml
//! [defaults]
//! model = "gpt-4o-mini"
//! temperature = 0.0
//! template = "concise"
//! labels = ["greeting", "refund", "fallback"]
//! label_policy = "enforce"
//!
//! [provider]
//! base_url = "http://localhost:11434/v1"
//! request_timeout_secs = 30
//!
//! [templates.terse]
//! system = "Intents: {labels}. Reply with JSON only."
//! human = "{text}"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::classifier::LabelPolicy;
use crate::templates::{DEFAULT_TEMPLATE, PromptTemplate, TemplateRegistry};
use crate::types::{ChatOptions, DEFAULT_MODEL, LabelSet};
use crate::{AugurError, Result};

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the provider base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Extra templates, keyed by name. Same-named built-ins are replaced.
    #[serde(default)]
    pub templates: BTreeMap<String, PromptTemplate>,
}

/// Defaults applied when the caller does not override them.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub label_policy: LabelPolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            template: default_template(),
            labels: Vec::new(),
            label_policy: LabelPolicy::default(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// Chat provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API. `OPENAI_BASE_URL` takes precedence.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; an error if it does not exist)
    /// 2. `~/.augur/config.toml`
    /// 3. `/etc/augur/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AugurError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AugurError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(AugurError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".augur").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/augur/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Built-in templates plus those declared in `[templates]`.
    pub fn registry(&self) -> TemplateRegistry {
        self.templates
            .iter()
            .fold(TemplateRegistry::builtin(), |registry, (name, template)| {
                registry.with_template(name.clone(), template.clone())
            })
    }

    /// Configured labels, or the defaults when none are set.
    pub fn labels(&self) -> LabelSet {
        LabelSet::new(self.defaults.labels.iter().cloned())
    }

    /// Chat options from `[defaults]`.
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions::new(&self.defaults.model).temperature(self.defaults.temperature)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_secs)
    }
}

/// Provider credentials, read from the process environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Read `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(API_KEY_ENV),
            base_url: lookup(BASE_URL_ENV),
        }
    }

    /// The API key, or [`AugurError::MissingCredential`] when it is absent.
    ///
    /// Only presence is checked; the key's format is left to the provider.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or(AugurError::MissingCredential(API_KEY_ENV))
    }

    /// Fill an unset base URL from the config file.
    pub fn with_fallback_base_url(mut self, base_url: Option<&str>) -> Self {
        if self.base_url.is_none() {
            self.base_url = base_url.map(String::from);
        }
        self
    }
}
