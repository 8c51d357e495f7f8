//! Configuration Loader
//!
//! Loads client settings from built-in defaults, JSON files and environment
//! variables, later sources overriding earlier ones.

use crate::config::settings::ClientSettings;
use crate::error::{ApiError, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const ENV_CONFIG_PATH: &str = "QUALYS_CONFIG_PATH";
pub const ENV_URL: &str = "QUALYS_URL";
pub const ENV_USERNAME: &str = "QUALYS_USERNAME";
pub const ENV_PASSWORD: &str = "QUALYS_PASSWORD";
pub const ENV_TOKEN: &str = "QUALYS_TOKEN";

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    settings: ClientSettings,
}

impl ConfigLoader {
    /// Load defaults, every settings file found in the default locations, then the environment
    pub fn new() -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_default_paths()?;
        loader.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(loader)
    }

    /// Load defaults, one specific settings file, then the environment
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_file(path)?;
        loader.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(loader)
    }

    /// Only the built-in defaults
    pub fn builtin() -> Result<Self> {
        let mut loader = Self {
            settings: ClientSettings::default(),
        };
        loader.load_builtin_defaults()?;
        Ok(loader)
    }

    /// Load built-in defaults
    fn load_builtin_defaults(&mut self) -> Result<()> {
        let defaults = include_str!("../../qualys.defaults.json");
        let settings: ClientSettings = serde_json::from_str(defaults).map_err(|e| {
            ApiError::Config(format!("Failed to parse built-in qualys.defaults.json: {}", e))
        })?;

        self.settings.merge(settings);
        Ok(())
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Get list of config paths to check, lowest precedence first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".qualys").join("config.json"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("qualys").join("config.json"));
        }

        paths.push(PathBuf::from("qualys.json"));

        if let Ok(custom_path) = std::env::var(ENV_CONFIG_PATH) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let settings: ClientSettings = serde_json::from_str(&content).map_err(|e| {
            ApiError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loaded client settings");
        self.settings.merge(settings);
        Ok(())
    }

    /// Apply `QUALYS_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        self.settings.merge(ClientSettings {
            base_url: read(ENV_URL),
            username: read(ENV_USERNAME),
            password: read(ENV_PASSWORD),
            bearer_token: read(ENV_TOKEN),
            ..Default::default()
        });
    }

    /// Get the loaded settings
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Take ownership of the settings
    pub fn into_settings(self) -> ClientSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ContentType;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_builtin_defaults() {
        let loader = ConfigLoader::builtin().unwrap();
        let settings = loader.settings();
        assert_eq!(
            settings.base_url(),
            "https://qualysapi.qg3.apps.qualys.com"
        );
        assert_eq!(settings.request_type, Some(ContentType::Json));
        assert_eq!(settings.response_type, Some(ContentType::Xml));
        assert!(settings.headers.contains_key("X-Requested-With"));
    }

    #[test]
    fn test_load_from_custom_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "base_url": "https://qualysapi.qg1.apps.qualys.com",
                "response_type": "application/json",
                "rate_limit": {{ "header_name": "X-Ratelimit-ToWait-Sec" }}
            }}"#
        )
        .unwrap();

        let mut loader = ConfigLoader::builtin().unwrap();
        loader.load_from_file(file.path()).unwrap();
        let settings = loader.into_settings();

        assert_eq!(settings.base_url(), "https://qualysapi.qg1.apps.qualys.com");
        assert_eq!(settings.response_type, Some(ContentType::Json));
        assert_eq!(settings.request_type, Some(ContentType::Json));
        assert_eq!(
            settings.rate_limit_config().header_name,
            "X-Ratelimit-ToWait-Sec"
        );
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let mut loader = ConfigLoader::builtin().unwrap();
        let err = loader.load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let mut loader = ConfigLoader::builtin().unwrap();
        let err = loader
            .load_from_file("/definitely/not/here/qualys.json")
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://qualysapi.qg4.apps.qualys.com"),
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "secret"),
            (ENV_TOKEN, ""),
        ]
        .into_iter()
        .collect();

        let mut loader = ConfigLoader::builtin().unwrap();
        loader.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        let settings = loader.settings();

        assert_eq!(settings.base_url(), "https://qualysapi.qg4.apps.qualys.com");
        assert_eq!(settings.username.as_deref(), Some("alice"));
        assert_eq!(settings.password.as_deref(), Some("secret"));
        assert_eq!(settings.bearer_token, None);
    }
}
