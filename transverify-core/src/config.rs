use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewError};

pub const CONFIG_ENV: &str = "TRANSVERIFY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "transverify.toml";

/// How tabular text is split into fields, on the way in and on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Split on every comma, quote-wrap on export without escaping.
    #[default]
    Naive,
    /// Quoted fields honoured on input, escaped on output.
    Rfc4180,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub input: InputConfig,
    pub export: ExportConfig,
    pub clipboard: ClipboardConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub session_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub column: String,
    pub dialect: Dialect,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub dialect: Dialect,
}

/// External program that receives the copied text on stdin,
/// e.g. `["xclip", "-selection", "clipboard"]`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClipboardConfig {
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            session_key: "transVerifyData".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            column: "text".to_string(),
            dialect: Dialect::Naive,
            chunk_size: 500,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./exports"),
            file_name: "arabic_translations_reviewed.csv".to_string(),
            dialect: Dialect::Naive,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReviewError::Config(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: AppConfig =
            toml::from_str(content).map_err(|e| ReviewError::Config(e.to_string()))?;
        if config.input.chunk_size == 0 {
            config.input.chunk_size = InputConfig::default().chunk_size;
        }
        Ok(config)
    }

    /// A missing file means defaults. A broken one is an error the caller
    /// reports once logging is up.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
