//! Dashboard Configuration Module
//! Display and I/O options, loadable from an optional JSON file.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "anydash.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// How bar chart group means are labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarLabelFormat {
    /// `$1,234.56` style: symbol, thousands separators, two decimals.
    Currency { symbol: String },
    /// `1234.56`
    Plain,
}

impl Default for BarLabelFormat {
    fn default() -> Self {
        BarLabelFormat::Currency {
            symbol: "$".to_string(),
        }
    }
}

/// All tunable options of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub page_title: String,
    /// Encoding label for csv/txt uploads. Latin-1 labels decode byte for
    /// byte; any other label is resolved through `encoding_rs`.
    pub text_encoding: String,
    pub infer_schema_length: usize,
    pub bar_label: BarLabelFormat,
    pub export_file_name: String,
    pub export_mime: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: "General Dataset Analysis".to_string(),
            text_encoding: "ISO-8859-1".to_string(),
            infer_schema_length: 10_000,
            bar_label: BarLabelFormat::default(),
            export_file_name: "Filtered_Data.csv".to_string(),
            export_mime: "text/csv".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Read `path` if it exists. A missing file yields defaults silently,
    /// an unreadable or malformed one yields defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.export_file_name, "Filtered_Data.csv");
        assert_eq!(config.export_mime, "text/csv");
        assert_eq!(config.text_encoding, "ISO-8859-1");
        assert_eq!(
            config.bar_label,
            BarLabelFormat::Currency {
                symbol: "$".to_string()
            }
        );
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = DashboardConfig::from_json(r#"{"bar_label": {"kind": "plain"}}"#).unwrap();
        assert_eq!(config.bar_label, BarLabelFormat::Plain);
        assert_eq!(config.infer_schema_length, 10_000);
    }

    #[test]
    fn test_load_or_default_falls_back_on_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let config = DashboardConfig::load_or_default(file.path());
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"page_title": "Sales"}}"#).unwrap();
        let config = DashboardConfig::load_or_default(file.path());
        assert_eq!(config.page_title, "Sales");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME));
        assert_eq!(config, DashboardConfig::default());
    }
}
