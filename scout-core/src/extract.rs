//! Result-card extraction from a DOM snapshot.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::driver::Page;
use crate::error::{Result, ScoutError};
use crate::feed::{CardSelectors, FeedProfile};
use crate::types::{RawCandidate, NO_NAME};

/// Compile one selector, naming the field in the error.
pub(crate) fn compile_selector(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::Selector(format!("{field} {css:?}: {e:?}")))
}

/// Trimmed text content of the first element matching `selector` under `root`.
pub(crate) fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Compiled form of [`CardSelectors`].
#[derive(Debug, Clone)]
pub(crate) struct CardSelectorSet {
    result: Selector,
    name: Selector,
    link: Selector,
    avatar: Selector,
    size: Selector,
    bio: Option<Selector>,
}

impl CardSelectorSet {
    pub(crate) fn compile(cards: &CardSelectors) -> Result<Self> {
        Ok(Self {
            result: compile_selector("result", &cards.result)?,
            name: compile_selector("name", &cards.name)?,
            link: compile_selector("link", &cards.link)?,
            avatar: compile_selector("avatar", &cards.avatar)?,
            size: compile_selector("size", &cards.size)?,
            bio: cards
                .bio
                .as_deref()
                .map(|css| compile_selector("bio", css))
                .transpose()?,
        })
    }
}

/// Reads result cards out of a loaded search page.
///
/// Field lookups never fail the extraction: a card missing its name gets
/// [`NO_NAME`], missing links, images, sizes and bios become empty strings.
#[derive(Debug, Clone)]
pub struct ProfileExtractor {
    selectors: CardSelectorSet,
    base_url: Option<Url>,
}

impl ProfileExtractor {
    /// Compile the card selectors of `feed`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Selector`] if any card selector is invalid.
    pub fn new(feed: &FeedProfile) -> Result<Self> {
        Ok(Self {
            selectors: CardSelectorSet::compile(&feed.cards)?,
            base_url: feed.base_url(),
        })
    }

    /// Snapshot `page` once and extract every result card on it.
    ///
    /// A snapshot that cannot be read is logged and yields no candidates.
    pub async fn extract(&self, page: &mut dyn Page, keyword: &str) -> Vec<RawCandidate> {
        match page.content().await {
            Ok(html) => self.parse(&html, keyword),
            Err(e) => {
                tracing::warn!(keyword, error = %e, "could not read results page");
                Vec::new()
            }
        }
    }

    /// Extract result cards from serialized HTML.
    pub fn parse(&self, html: &str, keyword: &str) -> Vec<RawCandidate> {
        let document = Html::parse_document(html);
        let candidates: Vec<RawCandidate> = document
            .select(&self.selectors.result)
            .map(|card| self.read_card(card, keyword))
            .collect();

        tracing::debug!(keyword, count = candidates.len(), "result cards parsed");
        candidates
    }

    fn read_card(&self, card: ElementRef<'_>, keyword: &str) -> RawCandidate {
        let s = &self.selectors;
        RawCandidate {
            display_name: first_text(card, &s.name).unwrap_or_else(|| NO_NAME.to_owned()),
            profile_url: self.first_attr(card, &s.link, "href"),
            avatar_url: self.first_attr(card, &s.avatar, "src"),
            size_label: first_text(card, &s.size).unwrap_or_default(),
            bio_text: s
                .bio
                .as_ref()
                .and_then(|bio| first_text(card, bio))
                .unwrap_or_default(),
            keyword: keyword.to_owned(),
        }
    }

    /// Attribute of the first match, resolved to an absolute URL when possible.
    fn first_attr(&self, card: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
        card.select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| self.resolve(raw))
            .unwrap_or_default()
    }

    fn resolve(&self, raw: &str) -> String {
        if let Ok(absolute) = Url::parse(raw) {
            return absolute.to_string();
        }
        match &self.base_url {
            Some(base) => base
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_owned()),
            None => raw.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YOUTUBE_RESULTS: &str = r#"<!DOCTYPE html>
<html><body>
<ytd-channel-renderer>
  <a id="main-link" href="/@chaintalk">
    <yt-img-shadow><img src="https://yt3.ggpht.com/chaintalk.jpg"></yt-img-shadow>
    <div id="text" class="style-scope ytd-channel-name"> Chain Talk </div>
  </a>
  <span id="video-count">61.2K subscribers</span>
</ytd-channel-renderer>
<ytd-channel-renderer>
  <a id="main-link" href="https://www.youtube.com/@nocount"></a>
  <div id="text" class="style-scope ytd-channel-name">No Count Here</div>
</ytd-channel-renderer>
<ytd-channel-renderer>
  <span id="video-count">2M subscribers</span>
</ytd-channel-renderer>
</body></html>"#;

    const TIKTOK_RESULTS: &str = r#"<html><body>
<div data-e2e="search-user-card">
  <a href="https://www.tiktok.com/@coinqueen"><img src="//p16.tiktokcdn.com/q.jpeg"></a>
  <p data-e2e="search-user-username">coinqueen</p>
  <div data-e2e="search-user-subtitle">88.1K</div>
  <p data-e2e="search-user-bio">Collabs: Queen@CoinMail.com</p>
</div>
<div data-e2e="search-user-card">
  <a href="/@quiet"></a>
  <p data-e2e="search-user-username">quiet</p>
  <div data-e2e="search-user-subtitle">1,234</div>
</div>
</body></html>"#;

    fn youtube() -> ProfileExtractor {
        ProfileExtractor::new(&FeedProfile::youtube_channels()).expect("preset compiles")
    }

    fn tiktok() -> ProfileExtractor {
        ProfileExtractor::new(&FeedProfile::tiktok_users()).expect("preset compiles")
    }

    #[test]
    fn youtube_cards_extracted_in_order() {
        let candidates = youtube().parse(YOUTUBE_RESULTS, "crypto");
        assert_eq!(candidates.len(), 3);

        let first = &candidates[0];
        assert_eq!(first.display_name, "Chain Talk");
        assert_eq!(first.profile_url, "https://youtube.com/@chaintalk");
        assert_eq!(first.avatar_url, "https://yt3.ggpht.com/chaintalk.jpg");
        assert_eq!(first.size_label, "61.2K subscribers");
        assert_eq!(first.bio_text, "");
        assert_eq!(first.keyword, "crypto");
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let candidates = youtube().parse(YOUTUBE_RESULTS, "crypto");

        let no_count = &candidates[1];
        assert_eq!(no_count.display_name, "No Count Here");
        assert_eq!(no_count.profile_url, "https://www.youtube.com/@nocount");
        assert_eq!(no_count.size_label, "");
        assert_eq!(no_count.avatar_url, "");

        let bare = &candidates[2];
        assert_eq!(bare.display_name, NO_NAME);
        assert_eq!(bare.profile_url, "");
        assert_eq!(bare.size_label, "2M subscribers");
    }

    #[test]
    fn tiktok_cards_carry_bio() {
        let candidates = tiktok().parse(TIKTOK_RESULTS, "coins");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].display_name, "coinqueen");
        assert_eq!(candidates[0].bio_text, "Collabs: Queen@CoinMail.com");
        assert_eq!(candidates[0].avatar_url, "https://p16.tiktokcdn.com/q.jpeg");
        assert_eq!(candidates[1].bio_text, "");
        assert_eq!(candidates[1].profile_url, "https://www.tiktok.com/@quiet");
        assert_eq!(candidates[1].size_label, "1,234");
    }

    #[test]
    fn page_without_results_is_empty() {
        assert!(youtube().parse("<html><body><p>nothing</p></body></html>", "x").is_empty());
        assert!(youtube().parse("", "x").is_empty());
    }

    #[test]
    fn invalid_selector_rejected() {
        let mut feed = FeedProfile::tiktok_users();
        feed.cards.bio = Some(":::".into());
        let err = ProfileExtractor::new(&feed).unwrap_err();
        assert!(err.to_string().contains("bio"));
    }
}
