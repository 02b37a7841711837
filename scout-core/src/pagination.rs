//! Infinite-scroll feed exhaustion.
//!
//! Each round scrolls to the bottom of the rendered feed, waits for new
//! cards to be injected, then probes the feed's end-of-results indicators.
//! The loop ends when any indicator is visible, after too many consecutive
//! rounds without the document growing, or at an absolute round cap,
//! whichever comes first.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::{Locator, Page};
use crate::feed::PaginationProfile;

/// Scrolls to the bottom and reports the document height.
pub const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.documentElement.scrollHeight); \
     return document.documentElement.scrollHeight;";

/// Bounds on how long a feed may be scrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationLimits {
    /// Consecutive rounds without the document growing before giving up.
    pub max_idle_rounds: u32,
    /// Hard cap on rounds, even while the feed keeps growing.
    pub max_rounds: u32,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            max_idle_rounds: 8,
            max_rounds: 400,
        }
    }
}

/// Why scrolling stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PaginationOutcome {
    /// An end-of-results indicator became visible.
    EndReached { rounds: u32 },
    /// The document stopped growing for `max_idle_rounds` rounds.
    Stalled { rounds: u32 },
    /// `max_rounds` elapsed.
    RoundLimit { rounds: u32 },
}

impl PaginationOutcome {
    pub fn rounds(&self) -> u32 {
        match *self {
            Self::EndReached { rounds } | Self::Stalled { rounds } | Self::RoundLimit { rounds } => {
                rounds
            }
        }
    }
}

/// Scroll `page` until the feed is exhausted or a bound is hit.
///
/// Probe misses and failed scroll scripts are never errors: they only mean
/// "not at the end yet" and "no progress this round" respectively.
pub async fn exhaust(
    page: &mut dyn Page,
    profile: &PaginationProfile,
    limits: &PaginationLimits,
) -> PaginationOutcome {
    let settle = Duration::from_millis(profile.settle_ms);
    let mut idle_rounds = 0u32;
    let mut last_height: Option<u64> = None;

    for round in 1..=limits.max_rounds {
        let height = match page.evaluate(SCROLL_SCRIPT, Vec::new()).await {
            Ok(value) => value.as_f64().map(|h| h as u64),
            Err(e) => {
                tracing::debug!(round, error = %e, "scroll script failed");
                None
            }
        };

        page.wait(settle).await;

        if end_reached(page, &profile.end_indicators).await {
            tracing::debug!(round, "end of results visible");
            return PaginationOutcome::EndReached { rounds: round };
        }

        // The first measured height is only a baseline; a round counts as
        // progress only when the document grew past an earlier measurement.
        let grew = matches!((height, last_height), (Some(now), Some(before)) if now > before);
        if height.is_some() && (grew || last_height.is_none()) {
            last_height = height;
        }
        if grew {
            idle_rounds = 0;
        } else {
            idle_rounds += 1;
        }

        tracing::trace!(round, ?height, idle_rounds, "scrolled");

        if idle_rounds >= limits.max_idle_rounds {
            tracing::debug!(round, idle_rounds, "feed stopped growing");
            return PaginationOutcome::Stalled { rounds: round };
        }
    }

    tracing::warn!(rounds = limits.max_rounds, "pagination hit round limit");
    PaginationOutcome::RoundLimit {
        rounds: limits.max_rounds,
    }
}

/// True if any indicator is visible.
async fn end_reached(page: &mut dyn Page, indicators: &[Locator]) -> bool {
    for indicator in indicators {
        if page.probe(indicator).await.is_visible() {
            return true;
        }
    }
    false
}
