// Combined settings for the resolver, the event bus and logging

use crate::{ConfigError, ConfigLoader, EnvLoader, Result};
use autowire_events::EventBusConfig;
use autowire_log::{Format, Level, LogConfig};
use autowire_resolver::{MAX_DEPTH_LIMIT, ResolverConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Everything an Autowire runtime can be configured with.
///
/// Every section is optional in files; missing keys keep their defaults.
///
/// ```toml
/// [resolver]
/// max_depth = 32
///
/// [events]
/// clear_after_dispatch = true
///
/// [log]
/// level = "debug"
/// format = "compact"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverConfig,
    pub events: EventBusConfig,
    pub log: LogConfig,
}

impl Settings {
    /// Load from a JSON or TOML file, then apply `AUTOWIRE_*` overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut settings = Self::load_file(path)?;
        settings.apply_env(&EnvLoader::autowire())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a JSON or TOML file only; the format follows the extension
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings: Self = ConfigLoader::open(path)?.load()?;
        debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Defaults overridden by `AUTOWIRE_*` variables
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_env(&EnvLoader::autowire())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Override fields from environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `AUTOWIRE_MAX_DEPTH` | `resolver.max_depth` |
    /// | `AUTOWIRE_EVENT_LOGGING` | `events.enable_logging` |
    /// | `AUTOWIRE_CLEAR_AFTER_DISPATCH` | `events.clear_after_dispatch` |
    /// | `AUTOWIRE_DEBUG` | `log.debug` |
    /// | `AUTOWIRE_LOG_LEVEL` | `log.level` |
    /// | `AUTOWIRE_LOG_FORMAT` | `log.format` |
    /// | `AUTOWIRE_LOG_COLOR` | `log.color` |
    pub fn apply_env(&mut self, env: &EnvLoader) -> Result<()> {
        if let Some(max_depth) = env.parse_var("max_depth")? {
            self.resolver.max_depth = max_depth;
        }
        if let Some(enabled) = env.flag("event_logging")? {
            self.events.enable_logging = enabled;
        }
        if let Some(enabled) = env.flag("clear_after_dispatch")? {
            self.events.clear_after_dispatch = enabled;
        }
        if let Some(enabled) = env.flag("debug")? {
            self.log.debug = enabled;
        }
        if let Ok(level) = env.load_var("log_level") {
            self.log.level = Level::parse(&level).ok_or(ConfigError::InvalidEnvValue {
                key: "AUTOWIRE_LOG_LEVEL".to_string(),
                value: level.clone(),
            })?;
        }
        if let Ok(format) = env.load_var("log_format") {
            self.log.format = Format::parse(&format).ok_or(ConfigError::InvalidEnvValue {
                key: "AUTOWIRE_LOG_FORMAT".to_string(),
                value: format.clone(),
            })?;
        }
        if let Some(enabled) = env.flag("log_color")? {
            self.log.color = enabled;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let depth = self.resolver.max_depth;
        if depth == 0 || depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "resolver.max_depth must be between 1 and {MAX_DEPTH_LIMIT}, got {depth}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> EnvLoader {
        EnvLoader::from_vars(
            Some(crate::env::ENV_PREFIX.to_string()),
            vars.iter().copied(),
        )
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(&env(&[
                ("AUTOWIRE_MAX_DEPTH", "16"),
                ("AUTOWIRE_CLEAR_AFTER_DISPATCH", "true"),
                ("AUTOWIRE_EVENT_LOGGING", "0"),
                ("AUTOWIRE_LOG_LEVEL", "warn"),
                ("AUTOWIRE_LOG_FORMAT", "pretty"),
            ]))
            .unwrap();

        assert_eq!(settings.resolver.max_depth, 16);
        assert!(settings.events.clear_after_dispatch);
        assert!(!settings.events.enable_logging);
        assert_eq!(settings.log.level, Level::Warn);
        assert_eq!(settings.log.format, Format::Pretty);
    }

    #[test]
    fn test_apply_env_without_vars_keeps_values() {
        let mut settings = Settings::default();
        settings.resolver.max_depth = 3;
        settings.apply_env(&env(&[])).unwrap();

        assert_eq!(settings.resolver.max_depth, 3);
        assert_eq!(settings.events, EventBusConfig::default());
    }

    #[test]
    fn test_apply_env_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.apply_env(&env(&[("AUTOWIRE_LOG_LEVEL", "loud")])),
            Err(ConfigError::InvalidEnvValue { key, .. }) if key == "AUTOWIRE_LOG_LEVEL"
        ));
        assert!(settings.apply_env(&env(&[("AUTOWIRE_MAX_DEPTH", "-1")])).is_err());
    }

    #[test]
    fn test_validate_max_depth() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.resolver.max_depth = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        settings.resolver.max_depth = MAX_DEPTH_LIMIT;
        assert!(settings.validate().is_ok());

        settings.resolver.max_depth = MAX_DEPTH_LIMIT + 1;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("between 1 and 128"));
    }
}
