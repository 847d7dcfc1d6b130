use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_input_path")]
    pub input_path: String,
    #[serde(default = "default_enriched_path")]
    pub enriched_path: String,
    #[serde(default = "default_report_path")]
    pub report_path: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_catalog_limit")]
    pub catalog_limit: usize,
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,
    /// Tried in order when reading the input file.
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_input_path() -> String {
    PathBuf::from("data").join("sales_data.txt").to_string_lossy().to_string()
}

fn default_enriched_path() -> String {
    PathBuf::from("data")
        .join("enriched_salesdata.txt")
        .to_string_lossy()
        .to_string()
}

fn default_report_path() -> String {
    PathBuf::from("output").join("sales_report.txt").to_string_lossy().to_string()
}

fn default_catalog_url() -> String {
    "https://dummyjson.com/products".to_string()
}

fn default_catalog_limit() -> usize {
    100
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

fn default_encodings() -> Vec<String> {
    vec!["utf-8".to_string(), "latin-1".to_string(), "cp1252".to_string()]
}

fn default_top_n() -> usize {
    5
}

fn default_low_stock_threshold() -> i64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            enriched_path: default_enriched_path(),
            report_path: default_report_path(),
            catalog_url: default_catalog_url(),
            catalog_limit: default_catalog_limit(),
            catalog_timeout_secs: default_catalog_timeout_secs(),
            encodings: default_encodings(),
            top_n: default_top_n(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sales-analytics")
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_settings(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings file {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SalesError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
