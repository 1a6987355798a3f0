use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::error::{ConfigError, FETCH_ERROR_TEXT};
use crate::core::handler::{Messages, EMPTY_PROMPT_TEXT, PROCESSING_TEXT};

pub const SERVER_ENV: &str = "ASKLINE_SERVER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub behaviour: BehaviourConfig,
    pub layout: LayoutConfig,
    pub text: TextConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub ask_path: String,
    /// Unset means whatever the HTTP client does by default.
    pub timeout_secs: Option<u64>,
}

/// What happens when Enter is pressed while an answer is still pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Every reply is shown as it arrives; the slowest one wins.
    Race,
    /// Enter does nothing until the pending reply has landed.
    SingleFlight,
    /// Replies to anything but the newest question are dropped.
    #[default]
    LatestWins,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourConfig {
    pub reentry: ReentryPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub input_field_height: u16, // Height in lines for input field
    pub rounded_borders: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub empty_prompt: String,
    pub processing: String,
    pub fetch_error: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://127.0.0.1:5000".to_string(),
            ask_path: "/ask".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            input_field_height: 3,
            rounded_borders: false,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            empty_prompt: EMPTY_PROMPT_TEXT.to_string(),
            processing: PROCESSING_TEXT.to_string(),
            fetch_error: FETCH_ERROR_TEXT.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl TextConfig {
    pub fn messages(&self) -> Messages {
        Messages {
            empty_prompt: self.empty_prompt.clone(),
            processing: self.processing.clone(),
            fetch_error: self.fetch_error.clone(),
        }
    }
}

impl Config {
    /// Loads the user config, writing the defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
            debug!(path = %path.display(), "config loaded");
            Ok(config)
        } else {
            let default_config = Config::default();
            default_config.save_to(path)?;
            info!(path = %path.display(), "wrote default config");
            Ok(default_config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let toml_content = toml::to_string_pretty(self)?;
        fs::write(path, toml_content).map_err(io_err)?;
        Ok(())
    }

    /// `--server` beats `ASKLINE_SERVER`, which beats the file.
    pub fn apply_server_override(&mut self, cli: Option<String>, env: Option<String>) {
        let non_empty = |url: Option<String>| url.filter(|u| !u.trim().is_empty());
        if let Some(url) = non_empty(cli).or_else(|| non_empty(env)) {
            debug!(base_url = %url, "server url overridden");
            self.server.base_url = url;
        }
    }

    fn get_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("askline"))
            .ok_or(ConfigError::NoConfigDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("askline").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nbase_url = \"http://faq.local:8080\"\n\n[behaviour]\nreentry = \"single_flight\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.server.base_url, "http://faq.local:8080");
        assert_eq!(config.server.ask_path, "/ask");
        assert_eq!(config.server.timeout(), None);
        assert_eq!(config.behaviour.reentry, ReentryPolicy::SingleFlight);
        assert_eq!(config.text.messages(), Messages::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nbase_url = 3").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_override_beats_env() {
        let mut config = Config::default();
        config.apply_server_override(Some("http://cli".into()), Some("http://env".into()));
        assert_eq!(config.server.base_url, "http://cli");

        let mut config = Config::default();
        config.apply_server_override(None, Some("http://env".into()));
        assert_eq!(config.server.base_url, "http://env");

        let mut config = Config::default();
        config.apply_server_override(Some(String::new()), Some("http://env".into()));
        assert_eq!(config.server.base_url, "http://env");

        let mut config = Config::default();
        config.apply_server_override(None, Some("  ".into()));
        assert_eq!(config.server.base_url, ServerConfig::default().base_url);
    }
}
