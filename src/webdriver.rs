//! [`Browser`] and [`Page`] over a W3C WebDriver server (chromedriver).
//!
//! One WebDriver session backs the [`Browser`]. The first page handed out
//! is the session's initial window; every later page is a fresh tab. All
//! pages share the session, so each operation first switches to its own
//! window.

use std::time::Duration;

use async_trait::async_trait;
use scout_core::{Browser, DriverError, Locator, Navigation, Page, Probe};
use thirtyfour::prelude::*;
use thirtyfour::{ChromeCapabilities, PageLoadStrategy};

use crate::config::WebDriverConfig;

/// Extra client-side wait past a navigation bound, covering the round trip
/// to the server that enforces it.
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

fn open_err(e: WebDriverError) -> DriverError {
    DriverError::Open(e.to_string())
}

fn other_err(e: WebDriverError) -> DriverError {
    DriverError::Other(e.to_string())
}

/// Chrome command-line switches for `config`.
pub fn chrome_args(config: &WebDriverConfig) -> Vec<String> {
    let mut args = vec![
        format!("--lang={}", config.locale),
        format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ),
    ];
    if config.headless {
        args.push("--headless=new".to_owned());
    }
    args
}

/// Session capabilities for `config`.
///
/// Navigations wait for `DOMContentLoaded` only; feeds keep loading media
/// long after their cards are in the document.
pub fn chrome_capabilities(config: &WebDriverConfig) -> WebDriverResult<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    for arg in chrome_args(config) {
        caps.add_arg(&arg)?;
    }
    caps.set_page_load_strategy(PageLoadStrategy::Eager)?;
    Ok(caps)
}

/// Map the server's answer to a navigation. A server-side page load timeout
/// is a recoverable outcome, not a failure.
fn navigation_outcome(result: WebDriverResult<()>) -> Result<Navigation, DriverError> {
    match result {
        Ok(()) => Ok(Navigation::Loaded),
        Err(WebDriverError::Timeout(_) | WebDriverError::WebDriverTimeout(_)) => {
            Ok(Navigation::TimedOut)
        }
        Err(e) => Err(DriverError::Navigation(e.to_string())),
    }
}

fn by_for(locator: &Locator) -> By {
    match locator {
        Locator::Css(css) => By::Css(css.as_str()),
        Locator::XPath(xpath) => By::XPath(xpath.as_str()),
        Locator::Text(text) => By::XPath(Locator::text_xpath(text).as_str()),
    }
}

/// A chromedriver session.
pub struct WebDriverBrowser {
    driver: WebDriver,
    initial_window_used: bool,
}

impl WebDriverBrowser {
    /// Start a browser session on the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Open`] if the server is unreachable or refuses
    /// the session.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, DriverError> {
        let caps = chrome_capabilities(config).map_err(open_err)?;
        let driver = WebDriver::new(config.server_url.as_str(), caps)
            .await
            .map_err(open_err)?;

        let page_load = Duration::from_secs(config.page_load_timeout_secs);
        if let Err(e) = driver.set_page_load_timeout(page_load).await {
            tracing::warn!(error = %e, "could not set page load timeout");
        }

        tracing::info!(
            server = %config.server_url,
            headless = config.headless,
            "webdriver session started"
        );
        Ok(Self {
            driver,
            initial_window_used: false,
        })
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn open_page(&mut self) -> Result<Box<dyn Page>, DriverError> {
        let window = if self.initial_window_used {
            self.driver.new_tab().await.map_err(open_err)?
        } else {
            self.initial_window_used = true;
            self.driver.window().await.map_err(open_err)?
        };
        Ok(Box::new(WebDriverPage {
            driver: self.driver.clone(),
            window,
        }))
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        tracing::debug!("ending webdriver session");
        self.driver.quit().await.map_err(other_err)
    }
}

/// One window of a [`WebDriverBrowser`] session.
pub struct WebDriverPage {
    driver: WebDriver,
    window: WindowHandle,
}

impl WebDriverPage {
    async fn focus(&self) -> Result<(), DriverError> {
        self.driver
            .switch_to_window(self.window.clone())
            .await
            .map_err(other_err)
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Navigation, DriverError> {
        self.focus().await?;
        // The server aborts the load at the bound; the client timeout only
        // guards against a server that never answers.
        if let Err(e) = self.driver.set_page_load_timeout(timeout).await {
            tracing::warn!(error = %e, "could not set navigation timeout");
        }
        match tokio::time::timeout(timeout + NAVIGATION_GRACE, self.driver.goto(url)).await {
            Ok(result) => navigation_outcome(result),
            Err(_) => {
                tracing::warn!(url = %url, "webdriver server did not answer navigation");
                Ok(Navigation::TimedOut)
            }
        }
    }

    async fn evaluate(
        &mut self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError> {
        self.focus().await?;
        let ret = self
            .driver
            .execute(script, args)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(ret.json().clone())
    }

    async fn content(&mut self) -> Result<String, DriverError> {
        self.focus().await?;
        self.driver.source().await.map_err(other_err)
    }

    async fn probe(&mut self, locator: &Locator) -> Probe {
        if self.focus().await.is_err() {
            return Probe::Miss;
        }
        let Ok(element) = self.driver.find(by_for(locator)).await else {
            return Probe::Miss;
        };
        match element.is_displayed().await {
            Ok(true) => Probe::Visible,
            _ => Probe::Miss,
        }
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        match self.driver.switch_to_window(self.window.clone()).await {
            Ok(()) => {}
            Err(WebDriverError::NoSuchWindow(_)) => {
                tracing::debug!("page window already closed");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not switch to page window before closing");
            }
        }
        self.driver.close_window().await.map_err(other_err)
    }
}
