use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use imglift_core::DEFAULT_ENDPOINT;

/// Placeholder API key shipped in the default config; uploads fail until the
/// user replaces it.
pub const PLACEHOLDER_API_KEY: &str = "your-imgbb-api-key";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Uploader configuration
    #[serde(default)]
    pub uploader: UploaderConfig,
    /// Vault configuration
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Image host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// API key for the image host
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Upload endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Maximum simultaneous uploads
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_uploads: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Root directory image paths are resolved against
    #[serde(default = "default_vault_path")]
    pub path: PathBuf,

    /// Compare declared paths against vault files byte-for-byte instead of
    /// case-insensitively
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            endpoint: default_endpoint(),
            max_concurrent_uploads: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
            case_sensitive: false,
        }
    }
}

fn default_api_key() -> String {
    PLACEHOLDER_API_KEY.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_max_concurrent() -> usize {
    imglift_core::DEFAULT_MAX_CONCURRENT_UPLOADS
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_vault_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

impl CliConfig {
    /// Load configuration with precedence: defaults < file < env < args
    pub fn load(config_file: Option<PathBuf>, vault_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;

        // Override with env vars
        if let Ok(key) = std::env::var("IMGLIFT_API_KEY") {
            config.uploader.api_key = key;
        }
        if let Ok(endpoint) = std::env::var("IMGLIFT_ENDPOINT") {
            config.uploader.endpoint = endpoint;
        }
        if let Ok(max) = std::env::var("IMGLIFT_MAX_CONCURRENT") {
            if let Ok(max) = max.parse() {
                config.uploader.max_concurrent_uploads = max;
            }
        }
        if let Ok(path) = std::env::var("IMGLIFT_VAULT_PATH") {
            config.vault.path = PathBuf::from(path);
        }

        // Override with CLI args (highest priority)
        if let Some(path) = vault_path {
            config.vault.path = path;
        }

        Ok(config)
    }

    /// Read the config file if it exists, otherwise start from defaults.
    fn from_file_or_default(config_file: Option<PathBuf>) -> Result<Self> {
        let path = match config_file {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Standard config file location: `~/.config/imglift/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("imglift").join("config.toml"))
    }

    /// Persist this configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = self.display_as_toml()?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn display_as_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Whether the API key is still the shipped placeholder.
    pub fn has_placeholder_key(&self) -> bool {
        self.uploader.api_key == PLACEHOLDER_API_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();

        assert_eq!(config.uploader.api_key, PLACEHOLDER_API_KEY);
        assert_eq!(config.uploader.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.uploader.max_concurrent_uploads, 4);
        assert!(config.has_placeholder_key());
        assert!(!config.vault.case_sensitive);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = CliConfig::default();
        config.uploader.api_key = "real-key".to_string();
        config.vault.path = PathBuf::from("/vault");
        config.save(&path).unwrap();

        let loaded = CliConfig::load(Some(path), None).unwrap();
        assert_eq!(loaded.uploader.api_key, "real-key");
        assert_eq!(loaded.vault.path, PathBuf::from("/vault"));
        assert!(!loaded.has_placeholder_key());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[uploader]\napi_key = \"abc\"\n").unwrap();

        let loaded = CliConfig::load(Some(path), None).unwrap();
        assert_eq!(loaded.uploader.api_key, "abc");
        assert_eq!(loaded.uploader.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(loaded.uploader.max_concurrent_uploads, 4);
    }

    #[test]
    fn test_cli_vault_override_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vault]\npath = \"/from-file\"\n").unwrap();

        let loaded = CliConfig::load(Some(path), Some(PathBuf::from("/from-args"))).unwrap();
        assert_eq!(loaded.vault.path, PathBuf::from("/from-args"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = CliConfig::load(Some(dir.path().join("absent.toml")), None).unwrap();
        assert!(loaded.has_placeholder_key());
    }
}
