use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::logging::log_warning;

// ============================================================================
// Main App Config
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Store search language, e.g. "english"
    pub catalog_language: String,
    /// Store search country code, e.g. "US"
    pub catalog_country: String,
    /// Runner binary override; `None` means `umu-run` from PATH
    pub runner: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_language: "english".to_string(),
            catalog_country: "US".to_string(),
            runner: None,
        }
    }
}

impl AppConfig {
    fn get_path() -> PathBuf {
        crate::front_path!("config.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::get_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => log_warning(&format!(
                        "Ignoring unreadable config {}: {}",
                        path.display(),
                        e
                    )),
                },
                Err(e) => log_warning(&format!("Failed to read {}: {}", path.display(), e)),
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        self.save_to(&Self::get_path());
    }

    pub fn save_to(&self, path: &std::path::Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, json);
        }
    }

    /// The runner binary to invoke for launches.
    pub fn runner(&self) -> &str {
        self.runner
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(crate::launch::DEFAULT_RUNNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.runner(), "umu-run");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "runner": "/opt/umu/umu-run" }"#).unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.runner(), "/opt/umu/umu-run");
        assert_eq!(config.catalog_country, "US");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            catalog_language: "german".to_string(),
            catalog_country: "DE".to_string(),
            runner: None,
        };
        config.save_to(&path);
        assert_eq!(AppConfig::load_from(&path), config);
    }
}
