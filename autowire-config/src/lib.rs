// Configuration loading for Autowire
//
// Settings come from a JSON or TOML file and are then overridden by
// `AUTOWIRE_*` environment variables.

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::Settings;
