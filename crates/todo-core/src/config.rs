//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/todo/config.toml)
//! 3. Environment variables (TODO_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DEFAULT_USER_ID;

/// Environment variable prefix
const ENV_PREFIX: &str = "TODO";

/// Slot name the display order is persisted under
pub const DEFAULT_ORDER_KEY: &str = "taskOrder";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote todo API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Directory for local state (persisted order, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Owner id attached to newly created items
    #[serde(default = "default_user_id")]
    pub user_id: i64,

    /// Slot key the display order is stored under
    #[serde(default = "default_order_key")]
    pub order_key: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Automatic refresh interval for the TUI, 0 disables it
    #[serde(default)]
    pub refresh_interval_secs: u64,

    /// Log file for TUI mode (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: default_data_dir(),
            user_id: default_user_id(),
            order_key: default_order_key(),
            timeout_secs: default_timeout_secs(),
            refresh_interval_secs: 0,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TODO_API_URL, TODO_DATA_DIR, ...)
    /// 2. Config file (~/.config/todo/config.toml or TODO_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_ORDER_KEY", ENV_PREFIX)) {
            if !val.is_empty() {
                self.order_key = val;
            }
        }

        // Unparseable numbers are ignored rather than failing startup
        if let Some(val) = env_number(&format!("{}_USER_ID", ENV_PREFIX)) {
            self.user_id = val;
        }
        if let Some(val) = env_number(&format!("{}_TIMEOUT_SECS", ENV_PREFIX)) {
            self.timeout_secs = val;
        }
        if let Some(val) = env_number(&format!("{}_REFRESH_INTERVAL_SECS", ENV_PREFIX)) {
            self.refresh_interval_secs = val;
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TODO_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todo")
            .join("config.toml")
    }

    /// HTTP request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Automatic refresh interval, if enabled
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Default path of the TUI log file
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn default_api_url() -> String {
    "http://localhost:3500".to_string()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todo")
}

fn default_user_id() -> i64 {
    DEFAULT_USER_ID
}

fn default_order_key() -> String {
    DEFAULT_ORDER_KEY.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "TODO_API_URL",
        "TODO_DATA_DIR",
        "TODO_USER_ID",
        "TODO_ORDER_KEY",
        "TODO_TIMEOUT_SECS",
        "TODO_REFRESH_INTERVAL_SECS",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:3500");
        assert_eq!(config.user_id, 1);
        assert_eq!(config.order_key, "taskOrder");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.refresh_interval().is_none());
        assert!(config.data_dir.ends_with("todo"));
    }

    #[test]
    fn test_log_path_default() {
        let mut config = Config::default();
        assert!(config.log_path().ends_with("debug.log"));

        config.log_file = Some(PathBuf::from("/var/log/todo.log"));
        assert_eq!(config.log_path(), PathBuf::from("/var/log/todo.log"));
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TODO_API_URL", "https://todos.example.com");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://todos.example.com");

        // Empty value keeps the current URL
        env::set_var("TODO_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://todos.example.com");
    }

    #[test]
    fn test_env_override_numbers() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TODO_USER_ID", "42");
        env::set_var("TODO_TIMEOUT_SECS", "3");
        env::set_var("TODO_REFRESH_INTERVAL_SECS", "30");
        config.apply_env_overrides();

        assert_eq!(config.user_id, 42);
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(30)));

        env::set_var("TODO_USER_ID", "not-a-number");
        config.apply_env_overrides();
        assert_eq!(config.user_id, 42);
    }

    #[test]
    fn test_env_override_data_dir_and_key() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TODO_DATA_DIR", "/tmp/todo-test");
        env::set_var("TODO_ORDER_KEY", "workOrder");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/todo-test"));
        assert_eq!(config.order_key, "workOrder");
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            api_url: "http://todos.local:8080".to_string(),
            data_dir: PathBuf::from("/data/todo"),
            user_id: 5,
            order_key: "taskOrder".to_string(),
            timeout_secs: 4,
            refresh_interval_secs: 15,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("api_url"));
        assert!(toml_str.contains("refresh_interval_secs"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_url, config.api_url);
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.user_id, 5);
        assert_eq!(parsed.refresh_interval_secs, 15);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"api_url = "http://example.com""#).unwrap();
        assert_eq!(config.api_url, "http://example.com");
        assert_eq!(config.order_key, "taskOrder");
        assert_eq!(config.user_id, 1);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("TODO_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:3500");
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            api_url: "http://saved.example".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.api_url, "http://saved.example");
        assert_eq!(loaded.data_dir, temp_dir.path().join("data"));
    }
}
