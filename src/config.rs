//! Configuration types for the creator-scout tool.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use scout_core::config::{parse_keywords, DEFAULT_MINIMUM_COUNT};
use scout_core::{FeedPreset, ScoutConfig, ScoutParams};

use crate::error::{AppError, Result};

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keywords, threshold, feed and pipeline bounds.
    pub scout: ScoutConfig,
    /// Browser session settings.
    pub webdriver: WebDriverConfig,
    /// Where and how records are written.
    pub output: OutputConfig,
}

/// WebDriver session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// URL of a running chromedriver (or compatible) server.
    pub server_url: String,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Browser UI language, passed as `--lang`.
    pub locale: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Session-wide page load limit in seconds.
    ///
    /// Each navigation replaces it with its own bound; this covers the
    /// session until the first one.
    pub page_load_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9515".to_owned(),
            headless: true,
            locale: "en-US".to_owned(),
            window_width: 1920,
            window_height: 1080,
            page_load_timeout_secs: 120,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File to write the JSON array to. `None` writes to stdout.
    pub path: Option<PathBuf>,
    /// Indent the JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: true,
        }
    }
}

/// Command-line overrides, applied on top of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub params: ScoutParams,
    pub feed: Option<FeedPreset>,
    pub output: Option<PathBuf>,
    pub webdriver_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/creator-scout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("creator-scout")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("creator-scout")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/creator-scout-config/config.toml")
        }
    }

    /// Apply command-line overrides.
    ///
    /// Keywords and threshold go through the same intake rules as host
    /// parameters: comma-separated keywords are split and trimmed, and a
    /// zero threshold means the default.
    pub fn apply(&mut self, overrides: Overrides) {
        let Overrides {
            params,
            feed,
            output,
            webdriver_url,
        } = overrides;

        if !params.keywords.trim().is_empty() {
            self.scout.keywords = parse_keywords(&params.keywords);
        }
        if let Some(count) = params.minimum_count {
            self.scout.minimum_count = if count == 0 {
                DEFAULT_MINIMUM_COUNT
            } else {
                count
            };
        }
        if let Some(headless) = params.headless {
            self.webdriver.headless = headless;
        }
        if let Some(feed) = feed {
            self.scout.feed = feed;
        }
        if let Some(path) = output {
            self.output.path = Some(path);
        }
        if let Some(url) = webdriver_url {
            self.webdriver.server_url = url;
        }
    }

    /// Validates the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for an unusable WebDriver section and
    /// [`AppError::Scout`] for an invalid scout section.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.webdriver.server_url).map_err(|e| {
            AppError::Config(format!(
                "webdriver.server_url {:?}: {e}",
                self.webdriver.server_url
            ))
        })?;
        if self.webdriver.window_width == 0 || self.webdriver.window_height == 0 {
            return Err(AppError::Config(
                "webdriver window size must be greater than 0".into(),
            ));
        }
        if self.webdriver.page_load_timeout_secs == 0 {
            return Err(AppError::Config(
                "webdriver.page_load_timeout_secs must be greater than 0".into(),
            ));
        }
        self.scout.validate()?;
        Ok(())
    }
}
