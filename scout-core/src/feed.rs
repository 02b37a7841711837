//! Feed profiles: where to search and how to read the results.
//!
//! A [`FeedProfile`] is pure data. It names the search endpoint, the CSS
//! selectors for result cards, how to tell that an infinite-scroll feed has
//! run dry, and (for two-stage feeds) how to read a profile's detail page.
//! Two presets ship built in; any other site can be described in the
//! config file without code changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::driver::Locator;
use crate::enrich::DetailSelectors;
use crate::error::{Result, ScoutError};
use crate::extract::CardSelectorSet;

/// Placeholder replaced by the percent-encoded keyword in a search URL.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

/// Built-in feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPreset {
    /// YouTube channel search: infinite scroll plus an `/about` page per channel.
    #[default]
    YouTube,
    /// TikTok user search: bio shown on the card, no second fetch.
    TikTok,
}

impl FeedPreset {
    /// Returns the human-readable name of this feed.
    pub fn name(&self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::TikTok => "tiktok",
        }
    }

    /// The selector map for this preset.
    pub fn profile(&self) -> FeedProfile {
        match self {
            Self::YouTube => FeedProfile::youtube_channels(),
            Self::TikTok => FeedProfile::tiktok_users(),
        }
    }

    /// Returns all available presets.
    pub fn all() -> &'static [FeedPreset] {
        &[Self::YouTube, Self::TikTok]
    }
}

impl fmt::Display for FeedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeedPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" | "yt" => Ok(Self::YouTube),
            "tiktok" | "tt" => Ok(Self::TikTok),
            other => Err(format!(
                "unknown feed {other:?}, expected one of: youtube, tiktok"
            )),
        }
    }
}

/// CSS selectors for one result card and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSelectors {
    /// Matches each result card.
    pub result: String,
    /// Display name text, relative to the card.
    pub name: String,
    /// Element whose `href` is the profile link.
    pub link: String,
    /// Element whose `src` is the avatar image.
    pub avatar: String,
    /// Audience size text.
    pub size: String,
    /// Bio text, for feeds that show it on the card.
    #[serde(default)]
    pub bio: Option<String>,
}

/// How to drive an infinite-scroll feed to its end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationProfile {
    /// Pause after each scroll so injected content can render.
    pub settle_ms: u64,
    /// Any one of these becoming visible means the feed is exhausted.
    pub end_indicators: Vec<Locator>,
}

/// How to read a profile's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentProfile {
    /// Appended to the profile URL, e.g. `/about`.
    pub url_suffix: String,
    /// Bound on the detail page load.
    pub timeout_secs: u64,
    /// Description text selector.
    pub description: String,
    /// Country text selector. Absent or unmatched yields
    /// [`crate::types::COUNTRY_NOT_SPECIFIED`].
    #[serde(default)]
    pub country: Option<String>,
}

/// Everything needed to scout one kind of feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedProfile {
    /// Short name used in logs.
    pub name: String,
    /// Search URL template containing [`KEYWORD_PLACEHOLDER`].
    pub search_url: String,
    /// Pause after the search page loads, before anything else happens.
    pub initial_settle_ms: u64,
    pub cards: CardSelectors,
    /// Present for infinite-scroll feeds.
    #[serde(default)]
    pub pagination: Option<PaginationProfile>,
    /// Present for two-stage feeds.
    #[serde(default)]
    pub enrichment: Option<EnrichmentProfile>,
    /// Drop records without a real email unless the run config overrides it.
    #[serde(default)]
    pub require_email: bool,
}

impl FeedProfile {
    /// YouTube channel search results.
    pub fn youtube_channels() -> Self {
        Self {
            name: "youtube".into(),
            search_url: "https://youtube.com/results?search_query={keyword}&sp=EgIQAg%253D%253D"
                .into(),
            initial_settle_ms: 20_000,
            cards: CardSelectors {
                result: "ytd-channel-renderer".into(),
                name: "#text.style-scope.ytd-channel-name".into(),
                link: "a#main-link".into(),
                avatar: "yt-img-shadow img".into(),
                // YouTube renders the subscriber count in the element with this id.
                size: "#video-count".into(),
                bio: None,
            },
            pagination: Some(PaginationProfile {
                settle_ms: 1_500,
                end_indicators: vec![
                    Locator::XPath(r#"//*[@id="message"]"#.into()),
                    Locator::Text("No more results".into()),
                ],
            }),
            enrichment: Some(EnrichmentProfile {
                url_suffix: "/about".into(),
                timeout_secs: 15,
                description: "#description-container".into(),
                country: Some("yt-formatted-string.country-inline, td.country".into()),
            }),
            require_email: true,
        }
    }

    /// TikTok user search results.
    pub fn tiktok_users() -> Self {
        Self {
            name: "tiktok".into(),
            search_url: "https://www.tiktok.com/search/user?q={keyword}".into(),
            initial_settle_ms: 10_000,
            cards: CardSelectors {
                result: r#"[data-e2e="search-user-card"]"#.into(),
                name: r#"[data-e2e="search-user-username"]"#.into(),
                link: "a".into(),
                avatar: "img".into(),
                size: r#"[data-e2e="search-user-subtitle"]"#.into(),
                bio: Some(r#"[data-e2e="search-user-bio"]"#.into()),
            },
            pagination: None,
            enrichment: None,
            require_email: false,
        }
    }

    /// The search URL for `keyword`, percent-encoded.
    pub fn search_url_for(&self, keyword: &str) -> String {
        self.search_url
            .replace(KEYWORD_PLACEHOLDER, &urlencoding::encode(keyword))
    }

    /// Base used to resolve relative links found on result cards.
    pub fn base_url(&self) -> Option<Url> {
        Url::parse(&self.search_url_for("")).ok()
    }

    /// Validates this profile, compiling every selector once.
    ///
    /// Checks:
    /// - `search_url` contains `{keyword}` and yields an absolute URL
    /// - every card, detail and CSS indicator selector compiles
    /// - pagination lists at least one end indicator
    /// - enrichment has a non-empty URL suffix and a timeout above zero
    pub fn validate(&self) -> Result<()> {
        if !self.search_url.contains(KEYWORD_PLACEHOLDER) {
            return Err(ScoutError::Config(format!(
                "feed {}: search_url must contain {KEYWORD_PLACEHOLDER}",
                self.name
            )));
        }
        if self.base_url().is_none() {
            return Err(ScoutError::Config(format!(
                "feed {}: search_url is not an absolute URL",
                self.name
            )));
        }

        CardSelectorSet::compile(&self.cards)?;

        if let Some(pagination) = &self.pagination {
            if pagination.end_indicators.is_empty() {
                return Err(ScoutError::Config(format!(
                    "feed {}: pagination needs at least one end indicator",
                    self.name
                )));
            }
            for indicator in &pagination.end_indicators {
                if let Locator::Css(css) = indicator {
                    scraper::Selector::parse(css).map_err(|e| {
                        ScoutError::Selector(format!("end indicator {css:?}: {e:?}"))
                    })?;
                }
            }
        }

        if let Some(enrichment) = &self.enrichment {
            if enrichment.url_suffix.is_empty() {
                return Err(ScoutError::Config(format!(
                    "feed {}: enrichment url_suffix must not be empty",
                    self.name
                )));
            }
            if enrichment.timeout_secs == 0 {
                return Err(ScoutError::Config(format!(
                    "feed {}: enrichment timeout_secs must be greater than 0",
                    self.name
                )));
            }
            DetailSelectors::compile(enrichment)?;
        }

        Ok(())
    }
}
