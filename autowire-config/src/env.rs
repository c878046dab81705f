// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Prefix of every variable Autowire reads
pub const ENV_PREFIX: &str = "AUTOWIRE";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,

    /// Fixed variable set used instead of the process environment
    vars: Option<HashMap<String, String>>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix, vars: None }
    }

    /// Loader reading `AUTOWIRE_*` variables
    pub fn autowire() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    /// Loader over a fixed set of variables instead of the process environment
    pub fn from_vars<K, V>(prefix: Option<String>, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix,
            vars: Some(
                vars.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = self.full_key(key);
        match self.vars {
            Some(ref vars) => vars
                .get(&full_key)
                .cloned()
                .ok_or(ConfigError::EnvError(env::VarError::NotPresent)),
            None => env::var(&full_key).map_err(ConfigError::EnvError),
        }
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Parse a variable if it is set
    pub fn parse_var<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        let Ok(value) = self.load_var(key) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                key: self.full_key(key),
                value,
            })
    }

    /// Parse a boolean flag: `1`/`true`/`yes` or `0`/`false`/`no`
    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        let Ok(value) = self.load_var(key) else {
            return Ok(None);
        };
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvValue {
                key: self.full_key(key),
                value,
            }),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
