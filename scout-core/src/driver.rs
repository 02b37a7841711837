//! Page-driver capability consumed by the pipeline.
//!
//! The pipeline never talks to a browser automation engine directly. It
//! drives a [`Browser`] that hands out [`Page`]s, each exposing the narrow
//! set of operations scouting needs: navigate, wait, evaluate a script,
//! snapshot the DOM, and probe for a visible element.
//!
//! Expected, recoverable outcomes are typed values rather than errors:
//! a navigation that exceeds its bound is [`Navigation::TimedOut`], and an
//! indicator that is not (yet) on screen is [`Probe::Miss`].

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// How a navigation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The document finished loading within the bound.
    Loaded,
    /// The bound elapsed first. Whatever content arrived is still usable.
    TimedOut,
}

/// Result of checking whether an element is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Visible,
    /// Absent, hidden, or the lookup itself failed.
    Miss,
}

impl Probe {
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Ways of pointing at an element in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// A CSS selector.
    Css(String),
    /// An XPath expression.
    #[serde(rename = "xpath")]
    XPath(String),
    /// Any element whose own text contains this literal.
    Text(String),
}

impl Locator {
    /// XPath equivalent of a [`Locator::Text`] lookup, usable by drivers that
    /// have no native text locator.
    pub fn text_xpath(text: &str) -> String {
        let literal = if !text.contains('"') {
            format!("\"{text}\"")
        } else if !text.contains('\'') {
            format!("'{text}'")
        } else {
            let parts: Vec<String> = text.split('"').map(|p| format!("\"{p}\"")).collect();
            format!("concat({})", parts.join(", '\"', "))
        };
        format!("//*[contains(text(), {literal})]")
    }
}

/// One browser page (tab or window).
#[async_trait]
pub trait Page: Send {
    /// Load `url`, waiting at most `timeout` for the document to be ready.
    ///
    /// Exceeding the bound is reported as [`Navigation::TimedOut`], not as an
    /// error.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Navigation, DriverError>;

    /// Let asynchronous page content settle.
    async fn wait(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Evaluate a script in the page and return its JSON-encoded result.
    async fn evaluate(
        &mut self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError>;

    /// Serialized snapshot of the current DOM.
    async fn content(&mut self) -> Result<String, DriverError>;

    /// Check whether `locator` matches a visible element. Never fails.
    async fn probe(&mut self, locator: &Locator) -> Probe;

    /// Release the page.
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// A browser session that can open pages.
#[async_trait]
pub trait Browser: Send {
    async fn open_page(&mut self) -> Result<Box<dyn Page>, DriverError>;

    /// End the session. Called exactly once, after every page is closed.
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// Run `body` against a freshly opened page and always close it afterwards.
///
/// The page is closed whether `body` returns normally or panics; a panic is
/// resumed once the page is released. Close failures are logged and do not
/// override the body's result.
///
/// # Errors
///
/// Returns the driver error if the page cannot be opened. `body` does not run
/// in that case.
pub async fn with_page<B, F, T>(browser: &mut B, body: F) -> Result<T, DriverError>
where
    B: Browser + ?Sized,
    F: for<'p> FnOnce(&'p mut dyn Page) -> BoxFuture<'p, T>,
{
    let mut page = browser.open_page().await?;
    let outcome = AssertUnwindSafe(body(page.as_mut())).catch_unwind().await;

    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "failed to close page");
    }

    match outcome {
        Ok(value) => Ok(value),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
