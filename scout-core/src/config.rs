//! Scouting run configuration with sensible defaults.
//!
//! [`ScoutConfig`] controls which keywords are searched, the audience
//! threshold, which feed is scouted, and how long the pipeline may wait on
//! the page. [`ScoutParams`] is the loosely-typed parameter object a host
//! hands over; [`ScoutConfig::from_params`] applies its intake rules.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};
use crate::feed::{FeedPreset, FeedProfile};
use crate::pagination::PaginationLimits;
use crate::types::SearchQuery;

/// Audience threshold used when none (or zero) is given.
pub const DEFAULT_MINIMUM_COUNT: u64 = 50_000;

/// Configuration for a scouting run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Keywords to search, in order. Each produces its own batch of records.
    pub keywords: Vec<String>,
    /// Minimum audience size a profile needs to be kept, inclusive.
    pub minimum_count: u64,
    /// Built-in feed to scout. Ignored when `custom_feed` is set.
    pub feed: FeedPreset,
    /// A complete feed description replacing the preset.
    pub custom_feed: Option<FeedProfile>,
    /// Drop records without an email. `None` uses the feed's own default.
    pub require_email: Option<bool>,
    /// Bound on loading a search results page, in seconds.
    pub navigation_timeout_secs: u64,
    /// Bounds on infinite-scroll pagination.
    pub pagination: PaginationLimits,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            minimum_count: DEFAULT_MINIMUM_COUNT,
            feed: FeedPreset::default(),
            custom_feed: None,
            require_email: None,
            navigation_timeout_secs: 30,
            pagination: PaginationLimits::default(),
        }
    }
}

impl ScoutConfig {
    /// Build a config from host parameters.
    ///
    /// Keywords are split on commas, trimmed, and empty entries dropped. An
    /// absent or zero `minimum_count` becomes [`DEFAULT_MINIMUM_COUNT`].
    pub fn from_params(params: &ScoutParams) -> Self {
        Self {
            keywords: parse_keywords(&params.keywords),
            minimum_count: match params.minimum_count {
                None | Some(0) => DEFAULT_MINIMUM_COUNT,
                Some(n) => n,
            },
            ..Self::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - no keyword is blank
    /// - `navigation_timeout_secs` must be greater than 0
    /// - pagination limits are non-zero and `max_idle_rounds <= max_rounds`
    /// - the selected feed profile is well formed
    pub fn validate(&self) -> Result<()> {
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ScoutError::Config("keywords must not be blank".into()));
        }
        if self.navigation_timeout_secs == 0 {
            return Err(ScoutError::Config(
                "navigation_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.pagination.max_rounds == 0 || self.pagination.max_idle_rounds == 0 {
            return Err(ScoutError::Config(
                "pagination limits must be greater than 0".into(),
            ));
        }
        if self.pagination.max_idle_rounds > self.pagination.max_rounds {
            return Err(ScoutError::Config(
                "pagination max_idle_rounds must be <= max_rounds".into(),
            ));
        }
        self.feed_profile().validate()
    }

    /// The feed profile this run scouts.
    pub fn feed_profile(&self) -> FeedProfile {
        self.custom_feed
            .clone()
            .unwrap_or_else(|| self.feed.profile())
    }

    /// Whether records without an email are dropped.
    pub fn require_email(&self) -> bool {
        self.require_email
            .unwrap_or_else(|| self.feed_profile().require_email)
    }

    /// One query per keyword, in order, all sharing the run's threshold.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.keywords
            .iter()
            .map(|keyword| SearchQuery {
                keyword: keyword.trim().to_owned(),
                threshold: self.minimum_count,
            })
            .collect()
    }
}

/// Parameters as a host workflow passes them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutParams {
    /// Comma-separated keywords.
    pub keywords: String,
    pub minimum_count: Option<u64>,
    /// `None` keeps the configured browser mode.
    pub headless: Option<bool>,
}

/// Split a comma-separated keyword list, trimming and dropping empty entries.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}
