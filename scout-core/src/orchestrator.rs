//! Keyword-by-keyword scouting pipeline.
//!
//! For each keyword the orchestrator drives the session's default page
//! through `NAVIGATE -> PAGINATE -> EXTRACT -> FILTER -> ENRICH -> EMIT`,
//! skipping pagination and enrichment for feeds that do not need them.
//! Keywords run sequentially and enrichment visits one detail page at a
//! time. Records come out grouped by keyword in input order, each group in
//! feed order.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;

use crate::config::ScoutConfig;
use crate::driver::{Browser, Navigation, Page};
use crate::enrich::EnrichmentFetcher;
use crate::error::{Result, ScoutError};
use crate::extract::ProfileExtractor;
use crate::feed::FeedProfile;
use crate::filter::filter_by_size;
use crate::pagination::{exhaust, PaginationOutcome};
use crate::types::{Measured, OutputRecord, RawCandidate, SearchQuery};

/// Per-keyword counts, for logging and run summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordReport {
    pub keyword: String,
    /// Result cards found on the fully scrolled page.
    pub discovered: usize,
    /// Cards whose audience met the threshold.
    pub qualified: usize,
    /// Records emitted after enrichment and email gating.
    pub emitted: usize,
    /// Why scrolling stopped, for paginated feeds.
    pub pagination: Option<PaginationOutcome>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub records: Vec<OutputRecord>,
    pub keywords: Vec<KeywordReport>,
}

/// A validated, ready-to-run scouting pipeline.
#[derive(Debug, Clone)]
pub struct Scout {
    config: ScoutConfig,
    feed: FeedProfile,
    extractor: ProfileExtractor,
    enricher: Option<EnrichmentFetcher>,
    require_email: bool,
}

impl Scout {
    /// Validate `config` and compile the selected feed's selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] or [`ScoutError::Selector`] if the
    /// config or feed profile is invalid.
    pub fn new(config: ScoutConfig) -> Result<Self> {
        config.validate()?;
        let feed = config.feed_profile();
        let extractor = ProfileExtractor::new(&feed)?;
        let enricher = feed
            .enrichment
            .as_ref()
            .map(EnrichmentFetcher::new)
            .transpose()?;
        let require_email = config.require_email();

        Ok(Self {
            config,
            feed,
            extractor,
            enricher,
            require_email,
        })
    }

    /// Run every keyword against `browser`, then close it.
    ///
    /// The browser and its default page are closed exactly once on every
    /// path, including a panic inside the pipeline (which is resumed after
    /// cleanup).
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Session`] if the default page cannot be opened.
    /// Nothing after that point fails the run.
    pub async fn run(&self, mut browser: Box<dyn Browser>) -> Result<RunReport> {
        let mut page = match browser.open_page().await {
            Ok(page) => page,
            Err(e) => {
                close_browser(browser).await;
                return Err(ScoutError::Session(e));
            }
        };

        let queries = self.config.queries();
        if queries.is_empty() {
            tracing::warn!("no keywords configured; nothing to scout");
        }

        let outcome = AssertUnwindSafe(self.scout_all(&queries, page.as_mut(), browser.as_mut()))
            .catch_unwind()
            .await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "failed to close default page");
        }
        close_browser(browser).await;

        match outcome {
            Ok(report) => Ok(report),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn scout_all(
        &self,
        queries: &[SearchQuery],
        page: &mut dyn Page,
        browser: &mut dyn Browser,
    ) -> RunReport {
        let mut report = RunReport::default();
        for query in queries {
            let (records, summary) = self.scout_keyword(query, page, browser).await;
            tracing::info!(
                feed = %self.feed.name,
                discovered = summary.discovered,
                qualified = summary.qualified,
                emitted = summary.emitted,
                "keyword done"
            );
            report.records.extend(records);
            report.keywords.push(summary);
        }
        tracing::info!(count = report.records.len(), "scouting finished");
        report
    }

    async fn scout_keyword(
        &self,
        query: &SearchQuery,
        page: &mut dyn Page,
        browser: &mut dyn Browser,
    ) -> (Vec<OutputRecord>, KeywordReport) {
        let keyword = query.keyword.as_str();
        let url = self.feed.search_url_for(keyword);
        let timeout = Duration::from_secs(self.config.navigation_timeout_secs);

        match page.navigate(&url, timeout).await {
            Ok(Navigation::Loaded) => tracing::debug!(keyword, url = %url, "search page loaded"),
            Ok(Navigation::TimedOut) => {
                tracing::warn!(keyword, "search page slow; continuing with partial content");
            }
            Err(e) => tracing::warn!(keyword, error = %e, "search navigation failed"),
        }
        page.wait(Duration::from_millis(self.feed.initial_settle_ms))
            .await;

        let pagination = match &self.feed.pagination {
            Some(profile) => {
                let outcome = exhaust(page, profile, &self.config.pagination).await;
                tracing::debug!(keyword, rounds = outcome.rounds(), ?outcome, "feed exhausted");
                Some(outcome)
            }
            None => None,
        };

        let candidates = self.extractor.extract(page, keyword).await;
        let discovered = candidates.len();

        let qualified = filter_by_size(candidates, query.threshold);
        let qualified_count = qualified.len();

        let records = match &self.enricher {
            Some(enricher) => enrich_all(enricher, qualified, browser).await,
            None => qualified.into_iter().map(OutputRecord::from_card).collect(),
        };
        let records: Vec<OutputRecord> = if self.require_email {
            records.into_iter().filter(|r| r.emails.is_found()).collect()
        } else {
            records
        };

        let summary = KeywordReport {
            keyword: keyword.to_owned(),
            discovered,
            qualified: qualified_count,
            emitted: records.len(),
            pagination,
        };
        (records, summary)
    }
}

/// Enrich survivors one at a time, in order.
///
/// Candidates without a profile URL, or whose detail page cannot be
/// opened, are skipped.
async fn enrich_all(
    enricher: &EnrichmentFetcher,
    qualified: Vec<Measured<RawCandidate>>,
    browser: &mut dyn Browser,
) -> Vec<OutputRecord> {
    let mut records = Vec::with_capacity(qualified.len());
    for Measured { item, audience } in qualified {
        if item.profile_url.is_empty() {
            tracing::debug!(name = %item.display_name, "no profile link; skipping enrichment");
            continue;
        }
        let url = item.profile_url.clone();
        match enricher.enrich(item, browser).await {
            Ok(enriched) => records.push(OutputRecord::from_enriched(Measured {
                item: enriched,
                audience,
            })),
            Err(e) => tracing::warn!(url = %url, error = %e, "could not open detail page; skipping"),
        }
    }
    records
}

async fn close_browser(browser: Box<dyn Browser>) {
    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Locator, Probe};
    use crate::error::DriverError;
    use crate::feed::FeedPreset;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Shared {
        pages: HashMap<String, String>,
        opened: usize,
        closed: usize,
        browser_closed: usize,
        refuse_after: Option<usize>,
        panic_on_content: bool,
    }

    struct FakePage {
        shared: Arc<Mutex<Shared>>,
        current: String,
    }

    #[async_trait]
    impl Page for FakePage {
        async fn navigate(&mut self, url: &str, _timeout: Duration) -> std::result::Result<Navigation, DriverError> {
            self.current = url.to_owned();
            Ok(Navigation::Loaded)
        }

        async fn wait(&mut self, _duration: Duration) {}

        async fn evaluate(&mut self, _script: &str, _args: Vec<Value>) -> std::result::Result<Value, DriverError> {
            Ok(Value::from(1000))
        }

        async fn content(&mut self) -> std::result::Result<String, DriverError> {
            let (crash, html) = {
                let shared = self.shared.lock().expect("lock");
                (shared.panic_on_content, shared.pages.get(&self.current).cloned())
            };
            if crash {
                panic!("renderer crashed");
            }
            Ok(html.unwrap_or_default())
        }

        async fn probe(&mut self, _locator: &Locator) -> Probe {
            Probe::Visible
        }

        async fn close(self: Box<Self>) -> std::result::Result<(), DriverError> {
            self.shared.lock().expect("lock").closed += 1;
            Ok(())
        }
    }

    struct FakeBrowser(Arc<Mutex<Shared>>);

    #[async_trait]
    impl Browser for FakeBrowser {
        async fn open_page(&mut self) -> std::result::Result<Box<dyn Page>, DriverError> {
            let mut shared = self.0.lock().expect("lock");
            if shared.refuse_after.is_some_and(|limit| shared.opened >= limit) {
                return Err(DriverError::Open("no more windows".into()));
            }
            shared.opened += 1;
            Ok(Box::new(FakePage {
                shared: Arc::clone(&self.0),
                current: String::new(),
            }))
        }

        async fn close(self: Box<Self>) -> std::result::Result<(), DriverError> {
            self.0.lock().expect("lock").browser_closed += 1;
            Ok(())
        }
    }

    fn tiktok_card(name: &str, size: &str, bio: &str) -> String {
        format!(
            r#"<div data-e2e="search-user-card"><a href="/@{name}"></a>
<p data-e2e="search-user-username">{name}</p>
<div data-e2e="search-user-subtitle">{size}</div>
<p data-e2e="search-user-bio">{bio}</p></div>"#
        )
    }

    fn tiktok_config(keywords: &[&str], minimum_count: u64) -> ScoutConfig {
        ScoutConfig {
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            minimum_count,
            feed: FeedPreset::TikTok,
            ..Default::default()
        }
    }

    fn shared_with(pages: Vec<(String, String)>) -> Arc<Mutex<Shared>> {
        Arc::new(Mutex::new(Shared {
            pages: pages.into_iter().collect(),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn filters_by_threshold_and_reports_counts() {
        let feed = FeedProfile::tiktok_users();
        let html = format!(
            "{}{}",
            tiktok_card("small", "40K", ""),
            tiktok_card("big", "60K", "mail big@studio.io")
        );
        let shared = shared_with(vec![(feed.search_url_for("coins"), html)]);

        let scout = Scout::new(tiktok_config(&["coins"], 50_000)).expect("valid");
        let report = scout
            .run(Box::new(FakeBrowser(Arc::clone(&shared))))
            .await
            .expect("run");

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "big");
        assert_eq!(report.records[0].audience, 60_000);
        assert_eq!(report.records[0].emails.addresses(), ["big@studio.io"]);
        assert_eq!(report.keywords[0].discovered, 2);
        assert_eq!(report.keywords[0].qualified, 1);
        assert_eq!(report.keywords[0].pagination, None);

        let shared = shared.lock().expect("lock");
        assert_eq!((shared.opened, shared.closed, shared.browser_closed), (1, 1, 1));
    }

    #[tokio::test]
    async fn require_email_override_drops_sentinel_records() {
        let feed = FeedProfile::tiktok_users();
        let html = format!(
            "{}{}",
            tiktok_card("quiet", "90K", "no contact"),
            tiktok_card("loud", "90K", "LOUD@x.com")
        );
        let shared = shared_with(vec![(feed.search_url_for("k"), html)]);

        let config = ScoutConfig {
            require_email: Some(true),
            ..tiktok_config(&["k"], 1)
        };
        let report = Scout::new(config)
            .expect("valid")
            .run(Box::new(FakeBrowser(shared)))
            .await
            .expect("run");

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "loud");
        assert_eq!(report.keywords[0].emitted, 1);
    }

    #[tokio::test]
    async fn session_failure_is_fatal_and_closes_browser() {
        let shared = shared_with(Vec::new());
        shared.lock().expect("lock").refuse_after = Some(0);

        let err = Scout::new(tiktok_config(&["k"], 1))
            .expect("valid")
            .run(Box::new(FakeBrowser(Arc::clone(&shared))))
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::Session(_)));
        assert_eq!(shared.lock().expect("lock").browser_closed, 1);
    }

    #[tokio::test]
    async fn enrichment_open_failure_skips_candidate() {
        let feed = FeedProfile::youtube_channels();
        let results = r#"<ytd-channel-renderer>
  <a id="main-link" href="/@one"><div id="text" class="style-scope ytd-channel-name">One</div></a>
  <span id="video-count">1M subscribers</span>
</ytd-channel-renderer>"#;
        let shared = shared_with(vec![(feed.search_url_for("k"), results.to_owned())]);
        // Default page only; every detail page is refused.
        shared.lock().expect("lock").refuse_after = Some(1);

        let config = ScoutConfig {
            keywords: vec!["k".into()],
            minimum_count: 1,
            ..Default::default()
        };
        let report = Scout::new(config)
            .expect("valid")
            .run(Box::new(FakeBrowser(Arc::clone(&shared))))
            .await
            .expect("run");

        assert!(report.records.is_empty());
        assert_eq!(report.keywords[0].qualified, 1);
        assert_eq!(
            report.keywords[0].pagination,
            Some(PaginationOutcome::EndReached { rounds: 1 })
        );
        let shared = shared.lock().expect("lock");
        assert_eq!((shared.opened, shared.closed, shared.browser_closed), (1, 1, 1));
    }

    #[tokio::test]
    async fn panic_in_pipeline_still_releases_session() {
        let shared = shared_with(Vec::new());
        shared.lock().expect("lock").panic_on_content = true;

        let scout = Scout::new(tiktok_config(&["k"], 1)).expect("valid");
        let browser = Box::new(FakeBrowser(Arc::clone(&shared)));
        let task = tokio::spawn(async move { scout.run(browser).await });

        assert!(task.await.is_err(), "panic should propagate");
        let shared = shared.lock().expect("lock");
        assert_eq!((shared.opened, shared.closed, shared.browser_closed), (1, 1, 1));
    }

    #[test]
    fn invalid_config_rejected_before_run() {
        let config = ScoutConfig {
            navigation_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(Scout::new(config), Err(ScoutError::Config(_))));
    }
}
