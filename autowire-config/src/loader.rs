// Settings files, decoded by the format their extension names

use crate::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::Path;

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Case-insensitive extension lookup
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Format named by the extension of `path`
    pub fn detect(path: &Path) -> Result<Self> {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return Err(ConfigError::LoadError(format!(
                "{} has no extension to pick a settings format from",
                path.display()
            )));
        };
        Self::from_extension(ext).ok_or_else(|| {
            ConfigError::LoadError(format!(
                "unsupported settings format `.{ext}` for {}",
                path.display()
            ))
        })
    }

    /// Decode `content` into `T`.
    ///
    /// Malformed documents give `ParseError`; well-formed documents whose
    /// shape does not fit `T` give `DeserializationError`.
    pub fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        let syntax = |e: String| ConfigError::ParseError(format!("invalid {self}: {e}"));

        match self {
            FileFormat::Json => {
                let document: serde_json::Value =
                    serde_json::from_str(content).map_err(|e| syntax(e.to_string()))?;
                serde_json::from_value(document)
                    .map_err(|e| ConfigError::DeserializationError(e.to_string()))
            }
            FileFormat::Toml => {
                let document: toml::Table =
                    content.parse().map_err(|e: toml::de::Error| syntax(e.to_string()))?;
                toml::Value::Table(document)
                    .try_into()
                    .map_err(|e: toml::de::Error| ConfigError::DeserializationError(e.to_string()))
            }
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Json => f.write_str("JSON"),
            FileFormat::Toml => f.write_str("TOML"),
        }
    }
}

/// One settings file and the format it is read in
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader<'a> {
    path: &'a Path,
    format: FileFormat,
}

impl<'a> ConfigLoader<'a> {
    /// Pick the format from the extension; the file is not read yet
    pub fn open(path: &'a Path) -> Result<Self> {
        Ok(Self {
            path,
            format: FileFormat::detect(path)?,
        })
    }

    /// Read `path` in an explicit format, whatever its extension
    pub fn with_format(path: &'a Path, format: FileFormat) -> Self {
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Read and decode the file
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let content = fs::read_to_string(self.path).map_err(|e| {
            ConfigError::LoadError(format!("cannot read {}: {e}", self.path.display()))
        })?;
        self.format.decode(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Resolver {
        max_depth: usize,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Document {
        resolver: Resolver,
    }

    #[test]
    fn test_decode_both_formats() {
        let expected = Document {
            resolver: Resolver { max_depth: 8 },
        };

        let json: Document = FileFormat::Json
            .decode(r#"{"resolver": {"max_depth": 8}}"#)
            .unwrap();
        let toml: Document = FileFormat::Toml
            .decode("[resolver]\nmax_depth = 8\n")
            .unwrap();

        assert_eq!(json, expected);
        assert_eq!(toml, expected);
    }

    #[test]
    fn test_syntax_and_shape_errors_differ() {
        let err = FileFormat::Json.decode::<Document>("{not json").unwrap_err();
        assert!(matches!(&err, ConfigError::ParseError(m) if m.starts_with("invalid JSON")));

        let err = FileFormat::Toml.decode::<Document>("[resolver").unwrap_err();
        assert!(matches!(&err, ConfigError::ParseError(m) if m.starts_with("invalid TOML")));

        let err = FileFormat::Toml
            .decode::<Document>("[resolver]\nmax_depth = \"deep\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::DeserializationError(_)));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);

        let loader = ConfigLoader::open(Path::new("conf/autowire.Json")).unwrap();
        assert_eq!(loader.format(), FileFormat::Json);
        assert_eq!(loader.path(), Path::new("conf/autowire.Json"));

        let err = FileFormat::detect(Path::new("autowire")).unwrap_err();
        assert!(err.to_string().contains("has no extension"));
        let err = FileFormat::detect(Path::new("autowire.ini")).unwrap_err();
        assert!(err.to_string().contains("unsupported settings format `.ini`"));
    }

    #[test]
    fn test_with_format_ignores_extension() {
        let mut file = tempfile::Builder::new().suffix(".conf").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"[resolver]\nmax_depth = 3\n").unwrap();

        let loader = ConfigLoader::with_format(file.path(), FileFormat::Toml);
        let document: Document = loader.load().unwrap();
        assert_eq!(document.resolver.max_depth, 3);
    }
}
