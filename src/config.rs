use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::document::DocClass;
use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub document: DocumentConfig,
    pub placeholders: Placeholders,
}

/// Metadata given to a freshly created document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub title: String,
    pub author: String,
    pub doc_class: DocClass,
    pub include_toc: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "My Report".to_string(),
            author: "Author".to_string(),
            doc_class: DocClass::Article,
            include_toc: true,
        }
    }
}

/// Text stamped into nodes when they are added.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Placeholders {
    pub chapter_title: String,
    pub section_title: String,
    pub subsection_title: String,
    pub text: String,
    pub figure_path: String,
    pub figure_caption: String,
    pub equation: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            chapter_title: "New Chapter".to_string(),
            section_title: "New Section".to_string(),
            subsection_title: "New Subsection".to_string(),
            text: "Enter your text here...".to_string(),
            figure_path: "image.png".to_string(),
            figure_caption: "Figure caption".to_string(),
            equation: "E = mc^2".to_string(),
        }
    }
}

impl Config {
    /// The configuration bundled with the crate.
    ///
    /// `build.rs` rejects a malformed bundled file, so the fallback to the
    /// hardcoded defaults only matters if the two ever drift apart.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::Config)
    }

    /// Load config from a TOML file, or return the bundled defaults if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::compiled_default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_hardcoded_defaults() {
        assert_eq!(Config::compiled_default(), Config::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = Config::from_toml("[document]\ndoc_class = \"report\"\n").unwrap();
        assert_eq!(config.document.doc_class, DocClass::Report);
        assert_eq!(config.document.title, "My Report");
        assert_eq!(config.placeholders, Placeholders::default());
    }

    #[test]
    fn unknown_class_is_rejected() {
        let err = Config::from_toml("[document]\ndoc_class = \"memoir\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config, Config::compiled_default());
    }
}
