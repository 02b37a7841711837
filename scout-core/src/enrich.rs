//! Second-stage enrichment from a profile's detail page.

use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::driver::{with_page, Browser, Navigation, Page};
use crate::email::{extract_emails, Emails};
use crate::error::{DriverError, Result};
use crate::extract::{compile_selector, first_text};
use crate::feed::EnrichmentProfile;
use crate::types::{EnrichedCandidate, RawCandidate, COUNTRY_NOT_SPECIFIED};

/// Compiled selectors for a detail page.
#[derive(Debug, Clone)]
pub(crate) struct DetailSelectors {
    description: Selector,
    country: Option<Selector>,
}

impl DetailSelectors {
    pub(crate) fn compile(profile: &EnrichmentProfile) -> Result<Self> {
        Ok(Self {
            description: compile_selector("description", &profile.description)?,
            country: profile
                .country
                .as_deref()
                .map(|css| compile_selector("country", css))
                .transpose()?,
        })
    }

    fn parse(&self, html: &str) -> ProfileDetails {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let description = first_text(root, &self.description).unwrap_or_default();
        let country = self
            .country
            .as_ref()
            .and_then(|sel| first_text(root, sel))
            .unwrap_or_else(|| COUNTRY_NOT_SPECIFIED.to_owned());
        let emails = extract_emails(&description);

        ProfileDetails {
            description,
            country,
            emails,
        }
    }
}

/// Fields read from a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDetails {
    pub description: String,
    pub country: String,
    pub emails: Emails,
}

impl ProfileDetails {
    fn unavailable() -> Self {
        Self {
            description: String::new(),
            country: COUNTRY_NOT_SPECIFIED.to_owned(),
            emails: Emails::NotFound,
        }
    }
}

/// Visits each candidate's detail page in its own short-lived page.
#[derive(Debug, Clone)]
pub struct EnrichmentFetcher {
    selectors: Arc<DetailSelectors>,
    url_suffix: String,
    timeout: Duration,
}

impl EnrichmentFetcher {
    /// # Errors
    ///
    /// Returns [`crate::ScoutError::Selector`] if a detail selector is invalid.
    pub fn new(profile: &EnrichmentProfile) -> Result<Self> {
        Ok(Self {
            selectors: Arc::new(DetailSelectors::compile(profile)?),
            url_suffix: profile.url_suffix.clone(),
            timeout: Duration::from_secs(profile.timeout_secs),
        })
    }

    /// The detail page URL for a profile URL.
    pub fn detail_url(&self, profile_url: &str) -> String {
        format!("{}{}", profile_url.trim_end_matches('/'), self.url_suffix)
    }

    /// Fetch `candidate`'s detail page and merge what it shows.
    ///
    /// A slow or failed load is not an error; whatever content loaded is
    /// used, down to no content at all. The auxiliary page is always closed.
    ///
    /// # Errors
    ///
    /// Returns the driver error only if the auxiliary page cannot be opened.
    pub async fn enrich<B>(
        &self,
        candidate: RawCandidate,
        browser: &mut B,
    ) -> std::result::Result<EnrichedCandidate, DriverError>
    where
        B: Browser + ?Sized,
    {
        let url = self.detail_url(&candidate.profile_url);
        let selectors = Arc::clone(&self.selectors);
        let timeout = self.timeout;

        let details = with_page(browser, move |page| {
            Box::pin(async move { fetch_details(page, &url, &selectors, timeout).await })
        })
        .await?;

        Ok(EnrichedCandidate {
            candidate,
            bio_text_detailed: details.description,
            country: details.country,
            emails: details.emails,
        })
    }
}

async fn fetch_details(
    page: &mut dyn Page,
    url: &str,
    selectors: &DetailSelectors,
    timeout: Duration,
) -> ProfileDetails {
    match page.navigate(url, timeout).await {
        Ok(Navigation::Loaded) => {}
        Ok(Navigation::TimedOut) => {
            tracing::debug!(url, "detail page slow; using partial content");
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "detail page navigation failed");
        }
    }

    match page.content().await {
        Ok(html) => selectors.parse(&html),
        Err(e) => {
            tracing::warn!(url, error = %e, "could not read detail page");
            ProfileDetails::unavailable()
        }
    }
}
