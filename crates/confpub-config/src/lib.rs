//! Configuration management for confpub.
//!
//! Parses `confpub.toml` with serde and searches parent directories for it
//! when no explicit path is given. CLI settings are applied during load via
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`:
//!
//! - `confluence.base_url`
//! - `confluence.server_id`
//! - `confluence.username`
//! - `confluence.password`
//! - `confluence.settings_file` (also expands `~`)
//! - `template.parameters.*`
//!
//! Credentials are looked up through [`CredentialChain`]: explicit values
//! first, then the settings store entry for the server id.

pub mod credentials;
mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use credentials::{
    CredentialChain, CredentialProvider, Credentials, ExplicitCredentials, Settings,
};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "confpub.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config. Parameters are merged
/// over the `[template.parameters]` table.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override server id used for the settings store lookup.
    pub server_id: Option<String>,
    /// Override username.
    pub username: Option<String>,
    /// Override password.
    pub password: Option<String>,
    /// Override wiki format flag.
    pub wiki_format: Option<bool>,
    /// Extra template parameters.
    pub parameters: Vec<(String, String)>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings.
    pub confluence: Option<ConfluenceConfig>,
    /// Publishing defaults.
    pub publish: PublishConfig,
    /// Template rendering settings.
    pub template: TemplateConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection configuration.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: String,
    /// Key into the settings store; defaults to `base_url`.
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for failed read requests.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Settings store with per-server credentials.
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_settings_file() -> String {
    "~/.confpub/settings.toml".to_owned()
}

impl ConfluenceConfig {
    /// Connection config for `base_url` with defaults everywhere else.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            server_id: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            settings_file: default_settings_file(),
        }
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_RETRIES: u32 = 10;

        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::Validation(format!(
                "confluence.max_retries cannot exceed {MAX_RETRIES}"
            )));
        }
        Ok(())
    }

    /// Server id for the settings store lookup.
    #[must_use]
    pub fn effective_server_id(&self) -> &str {
        self.server_id.as_deref().unwrap_or(&self.base_url)
    }

    /// Settings file path with `~` and `${VAR}` expanded.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvVar` if a referenced variable is unset.
    pub fn settings_path(&self) -> Result<PathBuf, ConfigError> {
        expand::expand_path(&self.settings_file, "confluence.settings_file")
    }

    /// Resolve credentials: explicit values, then the settings store.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings store exists but cannot be loaded.
    pub fn resolve_credentials(&self) -> Result<Option<Credentials>, ConfigError> {
        let explicit = ExplicitCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        let settings = Settings::load(&self.settings_path()?)?;
        let chain = CredentialChain::new().with(&explicit).with(&settings);
        Ok(chain.resolve(self.effective_server_id()))
    }
}

/// Publishing defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Templates produce wiki markup that must be converted to storage format.
    pub wiki_format: bool,
    /// Skip an update when its input file does not exist.
    pub skip_missing_input: bool,
    /// Skip every command without doing any work.
    pub skip: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            wiki_format: false,
            skip_missing_input: true,
            skip: false,
        }
    }
}

/// Template rendering settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Parameters passed to every template.
    pub parameters: BTreeMap<String, String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.password`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `confpub.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            match &mut self.confluence {
                Some(confluence) => confluence.base_url.clone_from(base_url),
                None => self.confluence = Some(ConfluenceConfig::new(base_url.clone())),
            }
        }
        if let Some(confluence) = &mut self.confluence {
            if let Some(server_id) = &settings.server_id {
                confluence.server_id = Some(server_id.clone());
            }
            if let Some(username) = &settings.username {
                confluence.username = Some(username.clone());
            }
            if let Some(password) = &settings.password {
                confluence.password = Some(password.clone());
            }
        }
        if let Some(wiki_format) = settings.wiki_format {
            self.publish.wiki_format = wiki_format;
        }
        for (key, value) in &settings.parameters {
            self.template.parameters.insert(key.clone(), value.clone());
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "[confluence] section or --url required".to_owned(),
            )
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.server_id =
                expand::expand_optional(confluence.server_id.as_deref(), "confluence.server_id")?;
            confluence.username =
                expand::expand_optional(confluence.username.as_deref(), "confluence.username")?;
            confluence.password =
                expand::expand_optional(confluence.password.as_deref(), "confluence.password")?;
        }

        for (key, value) in &mut self.template.parameters {
            *value = expand::expand_env(value, &format!("template.parameters.{key}"))?;
        }

        Ok(())
    }
}
