//! Autowire Logging
//!
//! The resolver and event crates emit `tracing` events and never install a
//! subscriber themselves. This crate turns a small configuration, usually
//! read from the environment, into an installed `tracing-subscriber`.
//!
//! # Usage
//!
//! ```rust,no_run
//! // Reads AUTOWIRE_* variables once and installs a global subscriber
//! autowire_log::init();
//!
//! tracing::info!(event = "user.created", "Emitting event");
//! ```
//!
//! # Environment Variables
//!
//! - `AUTOWIRE_DEBUG=1` - Enable debug logging
//! - `AUTOWIRE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `AUTOWIRE_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `AUTOWIRE_LOG_COLOR=1|0` - Enable/disable colors
//!
//! `RUST_LOG`, when set, takes precedence over the level.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
    /// Off (no logging)
    Off,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Filter directive understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Multi-line human readable output
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Global configuration, read from the environment on first use.
static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether debug mode is enabled; raises the level to at least `debug`
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether ANSI colors are enabled
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false, // JSON output doesn't use colors
        }
    }
}

impl LogConfig {
    /// Create config from `AUTOWIRE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| var(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("AUTOWIRE_DEBUG").unwrap_or(false);

        let level = var("AUTOWIRE_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = var("AUTOWIRE_LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = flag("AUTOWIRE_LOG_COLOR")
            .unwrap_or_else(|| var("NO_COLOR").is_none() && format != Format::Json);

        Self {
            debug,
            level,
            format,
            color,
        }
    }

    /// Level actually applied, with `debug` taken into account.
    pub fn effective_level(&self) -> Level {
        if self.debug && self.level > Level::Debug {
            Level::Debug
        } else {
            self.level
        }
    }
}

/// Get the global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Check if debug logging is enabled globally.
pub fn is_debug_enabled() -> bool {
    config().effective_level() <= Level::Debug
}

// ============================================================================
// Subscriber Installation
// ============================================================================

/// Install a global subscriber built from the environment.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with(config())
}

/// Install a global subscriber built from `config`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_with(config: &LogConfig) -> bool {
    use tracing_subscriber::EnvFilter;

    let level = config.effective_level();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.color)
        .with_target(true);

    let installed = match config.format {
        Format::Pretty => builder.pretty().try_init(),
        Format::Compact => builder.compact().try_init(),
        Format::Json => builder.json().try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(level = %level, format = ?config.format, "Logging initialized");
    }
    installed.is_ok()
}

// ============================================================================
// Tests
// ============================================================================
