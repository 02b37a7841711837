//! creator-scout: find social-media creators by keyword.
//!
//! This crate wires the [`scout_core`] pipeline to a real browser:
//! Config (TOML + CLI) → WebDriver session → Scout → JSON records
//!
//! # Architecture
//!
//! - **Config**: [`AppConfig`] loaded from TOML with command-line overrides
//! - **Browser**: [`webdriver::WebDriverBrowser`] drives chromedriver via `thirtyfour`
//! - **Pipeline**: [`scout_core::Scout`] searches, scrolls, filters and enriches
//! - **Output**: [`output::write_records`] emits one JSON array per run

pub mod config;
pub mod error;
pub mod output;
pub mod webdriver;

pub use config::{AppConfig, OutputConfig, Overrides, WebDriverConfig};
pub use error::{AppError, Result};

use scout_core::{RunReport, Scout};

/// Connect to the configured WebDriver server and run a full scout.
///
/// The config is validated before any browser session is started.
///
/// # Errors
///
/// Returns [`AppError::Scout`] for an invalid scout section or a lost
/// session, [`AppError::WebDriver`] if the session cannot be started, and
/// [`AppError::Config`] for an invalid WebDriver section.
pub async fn scout(config: &AppConfig) -> Result<RunReport> {
    config.validate()?;
    let scout = Scout::new(config.scout.clone())?;
    let browser = webdriver::WebDriverBrowser::connect(&config.webdriver).await?;
    Ok(scout.run(Box::new(browser)).await?)
}
