//! Core record types flowing through the scouting pipeline.

use serde::Serialize;

use crate::email::{extract_emails, Emails};

/// Placeholder used when a result card has no readable display name.
pub const NO_NAME: &str = "No name";

/// Placeholder used when a detail page does not show a country.
pub const COUNTRY_NOT_SPECIFIED: &str = "Country not specified";

/// One keyword search with its audience threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The keyword typed into the feed's search box.
    pub keyword: String,
    /// Minimum audience size, inclusive.
    pub threshold: u64,
}

/// A profile as it appears on a search results card.
///
/// Every field is always present; missing card elements are replaced by
/// [`NO_NAME`] or an empty string at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawCandidate {
    pub display_name: String,
    pub profile_url: String,
    pub avatar_url: String,
    /// Unparsed audience text, e.g. `"1.2M subscribers"`.
    pub size_label: String,
    /// Bio text shown on the card (empty for feeds that do not show one).
    pub bio_text: String,
    /// Keyword whose search surfaced this profile.
    pub keyword: String,
}

/// A candidate merged with what its detail page revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedCandidate {
    #[serde(flatten)]
    pub candidate: RawCandidate,
    pub bio_text_detailed: String,
    pub country: String,
    pub emails: Emails,
}

/// A value paired with its parsed audience size.
///
/// Produced by the size filter so later stages never reparse the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measured<T> {
    pub item: T,
    pub audience: u64,
}

/// The externally emitted record, one per surviving candidate per keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub name: String,
    pub url: String,
    pub avatar: String,
    /// Audience label exactly as displayed by the feed.
    pub size_label: String,
    /// Parsed audience size.
    pub audience: u64,
    /// Detail-page description when enriched, otherwise the card bio.
    pub description: String,
    /// Only present for feeds with a detail page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub emails: Emails,
    pub keyword: String,
}

impl OutputRecord {
    /// Build a record for a single-stage feed, scanning the card bio for emails.
    pub fn from_card(measured: Measured<RawCandidate>) -> Self {
        let Measured {
            item: candidate,
            audience,
        } = measured;
        let emails = extract_emails(&candidate.bio_text);
        Self {
            name: candidate.display_name,
            url: candidate.profile_url,
            avatar: candidate.avatar_url,
            size_label: candidate.size_label,
            audience,
            description: candidate.bio_text,
            country: None,
            emails,
            keyword: candidate.keyword,
        }
    }

    /// Build a record from a candidate enriched by its detail page.
    pub fn from_enriched(measured: Measured<EnrichedCandidate>) -> Self {
        let Measured {
            item: enriched,
            audience,
        } = measured;
        let candidate = enriched.candidate;
        Self {
            name: candidate.display_name,
            url: candidate.profile_url,
            avatar: candidate.avatar_url,
            size_label: candidate.size_label,
            audience,
            description: enriched.bio_text_detailed,
            country: Some(enriched.country),
            emails: enriched.emails,
            keyword: candidate.keyword,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(bio: &str) -> RawCandidate {
        RawCandidate {
            display_name: "Chain Talk".into(),
            profile_url: "https://www.youtube.com/@chaintalk".into(),
            avatar_url: "https://yt3.ggpht.com/a.jpg".into(),
            size_label: "61.2K subscribers".into(),
            bio_text: bio.into(),
            keyword: "crypto".into(),
        }
    }

    #[test]
    fn card_record_scans_bio_for_emails() {
        let record = OutputRecord::from_card(Measured {
            item: candidate("Business: Deals@ChainTalk.tv"),
            audience: 61_200,
        });
        assert_eq!(record.name, "Chain Talk");
        assert_eq!(record.audience, 61_200);
        assert_eq!(record.emails.addresses(), ["deals@chaintalk.tv"]);
        assert!(record.country.is_none());
        assert_eq!(record.description, "Business: Deals@ChainTalk.tv");
    }

    #[test]
    fn enriched_record_prefers_detailed_description() {
        let enriched = EnrichedCandidate {
            candidate: candidate("short bio"),
            bio_text_detailed: "Long about text".into(),
            country: "Canada".into(),
            emails: Emails::NotFound,
        };
        let record = OutputRecord::from_enriched(Measured {
            item: enriched,
            audience: 61_200,
        });
        assert_eq!(record.description, "Long about text");
        assert_eq!(record.country.as_deref(), Some("Canada"));
        assert_eq!(record.emails, Emails::NotFound);
        assert_eq!(record.keyword, "crypto");
    }

    #[test]
    fn record_json_shape() {
        let record = OutputRecord::from_card(Measured {
            item: candidate(""),
            audience: 61_200,
        });
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["emails"], serde_json::json!(["No email found"]));
        assert_eq!(json["size_label"], "61.2K subscribers");
        assert!(json.get("country").is_none());
    }

    #[test]
    fn enriched_candidate_flattens_card_fields() {
        let enriched = EnrichedCandidate {
            candidate: candidate(""),
            bio_text_detailed: "about".into(),
            country: COUNTRY_NOT_SPECIFIED.into(),
            emails: Emails::NotFound,
        };
        let json = serde_json::to_value(&enriched).expect("serialize");
        assert_eq!(json["display_name"], "Chain Talk");
        assert_eq!(json["country"], COUNTRY_NOT_SPECIFIED);
    }
}
