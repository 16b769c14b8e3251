//! Credential lookup as an ordered chain of providers.
//!
//! Each provider is a pure function of the server id it is asked about. The
//! chain asks providers in order and only takes fields that are still missing,
//! so explicit values always win over the settings store.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ConfigError;
use crate::expand;

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Account password or API token.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Fields found so far while walking the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl PartialCredentials {
    fn is_complete(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Fill missing fields from `other`; fields already set are kept.
    #[must_use]
    fn fill_from(self, other: PartialCredentials) -> Self {
        Self {
            username: self.username.or(other.username),
            password: self.password.or(other.password),
        }
    }
}

/// A single source of credentials.
pub trait CredentialProvider {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Credentials this provider knows for `server_id`.
    fn provide(&self, server_id: &str) -> PartialCredentials;
}

/// Credentials given directly on the command line or in `confpub.toml`.
#[derive(Debug, Default)]
pub struct ExplicitCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialProvider for ExplicitCredentials {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn provide(&self, _server_id: &str) -> PartialCredentials {
        PartialCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// User-level settings store (`~/.confpub/settings.toml`).
///
/// ```toml
/// [servers.corp]
/// username = "deploy"
/// password = "${CORP_WIKI_TOKEN}"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server entries keyed by server id.
    pub servers: BTreeMap<String, ServerEntry>,
}

/// Credentials stored for one server id.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerEntry {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Settings {
    /// Load the settings store. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or an
    /// `${VAR}` reference in it is unset.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut settings: Self = toml::from_str(&content)?;
        for (id, entry) in &mut settings.servers {
            entry.username =
                expand::expand_optional(entry.username.as_deref(), &format!("servers.{id}.username"))?;
            entry.password =
                expand::expand_optional(entry.password.as_deref(), &format!("servers.{id}.password"))?;
        }
        Ok(settings)
    }
}

impl CredentialProvider for Settings {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn provide(&self, server_id: &str) -> PartialCredentials {
        self.servers
            .get(server_id)
            .map(|entry| PartialCredentials {
                username: entry.username.clone(),
                password: entry.password.clone(),
            })
            .unwrap_or_default()
    }
}

/// Ordered list of credential providers.
#[derive(Default)]
pub struct CredentialChain<'a> {
    providers: Vec<&'a dyn CredentialProvider>,
}

impl<'a> CredentialChain<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier providers take precedence.
    #[must_use]
    pub fn with(mut self, provider: &'a dyn CredentialProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Walk the chain for `server_id`.
    ///
    /// Returns `None` when no provider yields both a username and a password;
    /// requests are then sent anonymously.
    pub fn resolve(&self, server_id: &str) -> Option<Credentials> {
        let mut found = PartialCredentials::default();
        for provider in &self.providers {
            if found.is_complete() {
                break;
            }
            let provided = provider.provide(server_id);
            if provided != PartialCredentials::default() {
                debug!(provider = provider.name(), server_id, "Credentials found");
            }
            found = found.fill_from(provided);
        }

        match found {
            PartialCredentials {
                username: Some(username),
                password: Some(password),
            } => Some(Credentials { username, password }),
            PartialCredentials {
                username: None,
                password: None,
            } => None,
            _ => {
                warn!(server_id, "Incomplete credentials, connecting anonymously");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn settings_with(id: &str, username: Option<&str>, password: Option<&str>) -> Settings {
        let mut servers = BTreeMap::new();
        servers.insert(
            id.to_owned(),
            ServerEntry {
                username: username.map(str::to_owned),
                password: password.map(str::to_owned),
            },
        );
        Settings { servers }
    }

    #[test]
    fn test_explicit_credentials_win() {
        let explicit = ExplicitCredentials {
            username: Some("alice".to_owned()),
            password: Some("secret".to_owned()),
        };
        let settings = settings_with("corp", Some("bob"), Some("other"));
        let chain = CredentialChain::new().with(&explicit).with(&settings);

        let creds = chain.resolve("corp").unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_settings_fill_missing_password() {
        let explicit = ExplicitCredentials {
            username: Some("alice".to_owned()),
            password: None,
        };
        let settings = settings_with("corp", Some("bob"), Some("from-settings"));
        let chain = CredentialChain::new().with(&explicit).with(&settings);

        let creds = chain.resolve("corp").unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "from-settings");
    }

    #[test]
    fn test_settings_lookup_by_server_id() {
        let explicit = ExplicitCredentials::default();
        let settings = settings_with("https://wiki.example.com", Some("bob"), Some("pw"));
        let chain = CredentialChain::new().with(&explicit).with(&settings);

        assert!(chain.resolve("corp").is_none());
        assert_eq!(
            chain.resolve("https://wiki.example.com"),
            Some(Credentials {
                username: "bob".to_owned(),
                password: "pw".to_owned(),
            })
        );
    }

    #[test]
    fn test_incomplete_credentials_are_anonymous() {
        let explicit = ExplicitCredentials {
            username: Some("alice".to_owned()),
            password: None,
        };
        let chain = CredentialChain::new().with(&explicit);
        assert!(chain.resolve("corp").is_none());
    }

    #[test]
    fn test_empty_chain_is_anonymous() {
        assert!(CredentialChain::new().resolve("corp").is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "alice".to_owned(),
            password: "hunter2".to_owned(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_settings_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.toml")).unwrap();
        assert!(settings.servers.is_empty());
    }

    #[test]
    fn test_settings_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[servers.corp]
username = "deploy"
password = "token"
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        let found = settings.provide("corp");
        assert_eq!(found.username.as_deref(), Some("deploy"));
        assert_eq!(found.password.as_deref(), Some("token"));
    }
}
