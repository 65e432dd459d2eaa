//! Framework configuration.
//!
//! Configuration is validated at load time, with environment overrides
//! applied on top of the file.
//!
//! ```toml
//! log_filter = "fixtura=debug"
//!
//! [suppliers]
//! server = "embedded"
//! database = "dev-mem"
//! ```
//!
//! `FIXTURA_SERVER=distribution` overrides the `server` entry above.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::ValueTypeAliases;
use crate::error::{FixtureError, Result};
use crate::types::ValueType;

/// Prefix of environment variables read by [`FrameworkConfig::from_env`].
pub const ENV_PREFIX: &str = "FIXTURA_";

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "FIXTURA_CONFIG";

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "FIXTURA_LOG";

/// Framework configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    /// Selected supplier alias per value-type alias.
    #[serde(default)]
    pub suppliers: BTreeMap<String, String>,

    /// Tracing filter directive for the log subscriber.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl FrameworkConfig {
    /// Creates an empty configuration: first discovered supplier wins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `supplier_alias` for the value type aliased `type_alias`.
    #[must_use]
    pub fn with_supplier(
        mut self,
        type_alias: impl AsRef<str>,
        supplier_alias: impl Into<String>,
    ) -> Self {
        self.suppliers
            .insert(config_key(type_alias.as_ref()), supplier_alias.into());
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns an error if the document cannot be parsed or is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(content)
            .map_err(|e| FixtureError::config(format!("failed to parse config: {e}")))?;
        let config = Self {
            suppliers: parsed
                .suppliers
                .into_iter()
                .map(|(k, v)| (config_key(&k), v))
                .collect(),
            log_filter: parsed.log_filter,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`FixtureError::Io`] if the file cannot be read, or a
    /// configuration error if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Loads the file named by `FIXTURA_CONFIG` (if set) and applies
    /// `FIXTURA_*` overrides from the process environment. Variables that
    /// are not valid Unicode are ignored.
    ///
    /// # Errors
    /// Returns an error if the named file cannot be loaded or the result
    /// is invalid.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(unicode_vars(std::env::vars_os()))
    }

    /// Applies `FIXTURA_<TYPE_ALIAS>=<supplier alias>` and `FIXTURA_LOG`
    /// overrides from `vars`; unrelated variables are ignored.
    ///
    /// # Errors
    /// Returns an error if the result is invalid.
    pub fn with_env_overrides<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            if key == CONFIG_ENV {
                continue;
            }
            if key == LOG_ENV {
                self.log_filter = Some(value.into());
                continue;
            }
            if let Some(type_alias) = key.strip_prefix(ENV_PREFIX) {
                if !type_alias.is_empty() {
                    self.suppliers.insert(config_key(type_alias), value.into());
                }
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if an entry is empty or malformed.
    pub fn validate(&self) -> Result<()> {
        for (type_alias, supplier_alias) in &self.suppliers {
            if type_alias.is_empty() {
                return Err(FixtureError::config("value type alias cannot be empty"));
            }
            if supplier_alias.is_empty() {
                return Err(FixtureError::config(format!(
                    "supplier alias for '{type_alias}' cannot be empty"
                )));
            }
            if !is_identifier(supplier_alias) {
                return Err(FixtureError::config(format!(
                    "supplier alias '{supplier_alias}' must contain only alphanumeric characters, hyphens, and underscores"
                )));
            }
        }
        if self.log_filter.as_deref().is_some_and(str::is_empty) {
            return Err(FixtureError::config("log_filter cannot be empty"));
        }
        Ok(())
    }

    /// Returns the supplier alias selected for `value_type`, if any.
    #[must_use]
    pub fn selected_supplier(
        &self,
        value_type: ValueType,
        aliases: &ValueTypeAliases,
    ) -> Option<&str> {
        self.suppliers
            .get(&config_key(&aliases.alias_or_name(value_type)))
            .map(String::as_str)
    }
}

/// Normalises a value-type alias into a configuration key.
fn config_key(type_alias: &str) -> String {
    type_alias.to_ascii_lowercase().replace('-', "_")
}

/// Drops environment entries whose key or value is not valid Unicode.
fn unicode_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn is_identifier(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
