//! Generation options
//!
//! Options are normally built in code. Hosts that keep their font setup in
//! a file can load it from TOML instead:
//!
//! ```toml
//! [fonts]
//! default = "Times-Roman"
//!
//! [fonts.custom]
//! Sarabun = "fonts/Sarabun-Regular.ttf"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GenerateError;

/// Where a custom font's bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl FontSource {
    pub fn load(&self) -> Result<Vec<u8>, GenerateError> {
        match self {
            FontSource::Bytes(bytes) => Ok(bytes.clone()),
            FontSource::Path(path) => Ok(fs::read(path)?),
        }
    }
}

impl From<Vec<u8>> for FontSource {
    fn from(bytes: Vec<u8>) -> Self {
        FontSource::Bytes(bytes)
    }
}

impl From<PathBuf> for FontSource {
    fn from(path: PathBuf) -> Self {
        FontSource::Path(path)
    }
}

impl From<&Path> for FontSource {
    fn from(path: &Path) -> Self {
        FontSource::Path(path.to_path_buf())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Font name, as used by elements, to font program
    pub custom_font_map: HashMap<String, FontSource>,
    /// Used when an element's font cannot be resolved. Helvetica when unset.
    pub default_font: Option<String>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_font(mut self, name: impl Into<String>, source: impl Into<FontSource>) -> Self {
        self.custom_font_map.insert(name.into(), source.into());
        self
    }

    pub fn with_default_font(mut self, name: impl Into<String>) -> Self {
        self.default_font = Some(name.into());
        self
    }
}

/// TOML form of [`GenerateOptions`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub fonts: FontsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontsConfig {
    #[serde(default)]
    pub default: Option<String>,
    /// Font name to font file path
    #[serde(default)]
    pub custom: BTreeMap<String, PathBuf>,
}

impl GeneratorConfig {
    /// Load from a TOML file. Relative font paths are resolved against the
    /// directory holding the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            for font_path in config.fonts.custom.values_mut() {
                if font_path.is_relative() {
                    *font_path = dir.join(&*font_path);
                }
            }
        }
        Ok(config)
    }

    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse generator TOML configuration")
    }

    pub fn to_options(&self) -> GenerateOptions {
        GenerateOptions {
            custom_font_map: self
                .fonts
                .custom
                .iter()
                .map(|(name, path)| (name.clone(), FontSource::Path(path.clone())))
                .collect(),
            default_font: self.fonts.default.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_toml() {
        let config = GeneratorConfig::from_toml(
            r#"
            [fonts]
            default = "Courier"

            [fonts.custom]
            Sarabun = "/opt/fonts/Sarabun.ttf"
            "#,
        )
        .unwrap();
        let options = config.to_options();
        assert_eq!(options.default_font.as_deref(), Some("Courier"));
        assert_eq!(
            options.custom_font_map.get("Sarabun"),
            Some(&FontSource::Path(PathBuf::from("/opt/fonts/Sarabun.ttf")))
        );
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = GeneratorConfig::from_toml("").unwrap();
        assert!(config.fonts.default.is_none());
        assert!(config.to_options().custom_font_map.is_empty());
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[fonts.custom]\nBody = \"fonts/body.ttf\"").unwrap();

        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(
            config.fonts.custom.get("Body"),
            Some(&dir.path().join("fonts/body.ttf"))
        );
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = GeneratorConfig::from_file("/nonexistent/generator.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_font_source_load_missing_path_is_io_error() {
        let src = FontSource::Path(PathBuf::from("/nonexistent/font.ttf"));
        assert!(matches!(src.load(), Err(GenerateError::Io(_))));
    }
}
