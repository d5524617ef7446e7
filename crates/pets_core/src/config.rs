//! Provider configuration.
//!
//! # Invariants
//! - `scheme` and `authority` are validated before any identifier is built.
//! - `database_path = None` selects a private in-memory store.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_SCHEME: &str = "content";
pub const DEFAULT_AUTHORITY: &str = "com.example.android.pets";

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*$").expect("valid scheme regex"));
static AUTHORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$").expect("valid authority regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidScheme(String),
    InvalidAuthority(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidScheme(value) => write!(f, "invalid resource scheme: `{value}`"),
            Self::InvalidAuthority(value) => write!(f, "invalid resource authority: `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for [`crate::PetProvider::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Identifier scheme, e.g. `content`.
    pub scheme: String,
    /// Fixed namespace between `://` and `/pets`.
    pub authority: String,
    /// SQLite file; in-memory when absent.
    pub database_path: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            database_path: None,
        }
    }
}

impl ProviderConfig {
    /// Default identifiers backed by the database file at `path`.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SCHEME_RE.is_match(&self.scheme) {
            return Err(ConfigError::InvalidScheme(self.scheme.clone()));
        }
        if !AUTHORITY_RE.is_match(&self.authority) {
            return Err(ConfigError::InvalidAuthority(self.authority.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ProviderConfig};

    #[test]
    fn default_config_is_valid() {
        ProviderConfig::default()
            .validate()
            .expect("defaults should validate");
    }

    #[test]
    fn rejects_authority_with_path_separator() {
        let config = ProviderConfig {
            authority: "pets/evil".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::InvalidAuthority("pets/evil".to_string())
        );
    }

    #[test]
    fn rejects_uppercase_or_empty_scheme() {
        for scheme in ["", "Content", "1abc"] {
            let config = ProviderConfig {
                scheme: scheme.to_string(),
                ..ProviderConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidScheme(_))
            ));
        }
    }
}
