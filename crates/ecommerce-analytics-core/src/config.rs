use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

pub const DATA_DIR_ENV: &str = "ECOMMERCE_DATA_DIR";
pub const MISSING_TEXT_ENV: &str = "ECOMMERCE_MISSING_TEXT";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MISSING_TEXT: &str = "Inconnu";

/// Where the partitioned tables live and how absent optional text is spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub missing_text: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            missing_text: DEFAULT_MISSING_TEXT.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(text) = std::env::var(MISSING_TEXT_ENV) {
            config.missing_text = text;
        }
        config
    }

    /// Overlays the keys present in a TOML document; absent keys keep their current value.
    pub fn merge_toml_str(mut self, contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(text) = file.missing_text {
            self.missing_text = text;
        }
        Ok(self)
    }

    pub fn merge_toml_path(self, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        self.merge_toml_str(&contents)
    }

    /// Environment, then the optional TOML file, then an explicit data directory.
    pub fn layered(config_file: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_env();
        if let Some(path) = config_file {
            config = config.merge_toml_path(path)?;
        }
        if let Some(dir) = data_dir {
            config.data_dir = dir.to_path_buf();
        }
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    missing_text: Option<String>,
}
