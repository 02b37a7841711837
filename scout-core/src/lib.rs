//! # scout-core
//!
//! Keyword-driven discovery of social-media creator profiles.
//!
//! Given a list of keywords and an audience threshold, this crate searches a
//! feed for each keyword, scrolls the results to the end, reads every result
//! card, keeps the profiles whose audience meets the threshold, and pulls
//! contact emails out of their descriptions. Feeds that hide the description
//! behind a profile page get a second, per-profile fetch.
//!
//! ## Design
//!
//! - The browser is an opaque capability: anything implementing
//!   [`driver::Browser`] and [`driver::Page`] can be scouted with
//! - Feeds are data ([`FeedProfile`]); YouTube and TikTok ship as presets
//! - Audience labels like `"12.3K"`, `"4M"` and `"1,234"` are parsed once and
//!   carried alongside each candidate
//! - Graceful degradation: slow pages, missing elements and unparseable
//!   labels never fail a run; only losing the browser session does
//!
//! ## Privacy
//!
//! - Keywords and URLs are logged only at debug or trace level
//! - Nothing is persisted; records are returned to the caller

pub mod config;
pub mod driver;
pub mod email;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod feed;
pub mod filter;
pub mod orchestrator;
pub mod pagination;
pub mod size;
pub mod types;

pub use config::{ScoutConfig, ScoutParams};
pub use driver::{with_page, Browser, Locator, Navigation, Page, Probe};
pub use email::{extract_emails, Emails};
pub use error::{DriverError, Result, ScoutError};
pub use feed::{FeedPreset, FeedProfile};
pub use orchestrator::{KeywordReport, RunReport, Scout};
pub use size::{parse_size, ParseFailure};
pub use types::{OutputRecord, RawCandidate, SearchQuery};

/// Scout every keyword in `config` using `browser`.
///
/// Validates the config, runs each keyword in order, and returns one record
/// per surviving profile per keyword. The browser session is closed before
/// this returns, whatever happens.
///
/// # Errors
///
/// Returns [`ScoutError::Config`] or [`ScoutError::Selector`] for an invalid
/// config, and [`ScoutError::Session`] if the browser's default page cannot
/// be opened.
///
/// # Examples
///
/// ```no_run
/// # async fn example(browser: Box<dyn scout_core::Browser>) -> scout_core::Result<()> {
/// let params = scout_core::ScoutParams {
///     keywords: "crypto, defi".into(),
///     ..Default::default()
/// };
/// let config = scout_core::ScoutConfig::from_params(&params);
/// for record in scout_core::run(config, browser).await? {
///     println!("{} ({}): {:?}", record.name, record.audience, record.emails);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run(config: ScoutConfig, browser: Box<dyn Browser>) -> Result<Vec<OutputRecord>> {
    let scout = match Scout::new(config) {
        Ok(scout) => scout,
        Err(e) => {
            if let Err(close_err) = browser.close().await {
                tracing::warn!(error = %close_err, "failed to close browser session");
            }
            return Err(e);
        }
    };
    Ok(scout.run(browser).await?.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct UnusedBrowser(Arc<AtomicBool>);

    #[async_trait]
    impl Browser for UnusedBrowser {
        async fn open_page(&mut self) -> std::result::Result<Box<dyn Page>, DriverError> {
            Err(DriverError::Open("should not be called".into()))
        }

        async fn close(self: Box<Self>) -> std::result::Result<(), DriverError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_validates_config_and_closes_browser() {
        let closed = Arc::new(AtomicBool::new(false));
        let config = ScoutConfig {
            navigation_timeout_secs: 0,
            ..Default::default()
        };
        let result = run(config, Box::new(UnusedBrowser(Arc::clone(&closed)))).await;

        assert!(result.unwrap_err().to_string().contains("navigation_timeout_secs"));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn run_surfaces_session_failure() {
        let closed = Arc::new(AtomicBool::new(false));
        let config = ScoutConfig {
            keywords: vec!["k".into()],
            ..Default::default()
        };
        let result = run(config, Box::new(UnusedBrowser(Arc::clone(&closed)))).await;

        assert!(matches!(result, Err(ScoutError::Session(_))));
        assert!(closed.load(Ordering::SeqCst));
    }
}
