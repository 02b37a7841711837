//! Contact email extraction from free-text profile descriptions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Placeholder emitted in place of an email list when nothing matched.
///
/// Contains spaces and no `@`, so it can never be mistaken for an address.
pub const NO_EMAIL_FOUND: &str = "No email found";

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern compiles")
});

/// Emails found in a piece of text.
///
/// Either a non-empty list of distinct lowercase addresses or the explicit
/// "nothing found" marker; the two never mix. Serializes as a JSON array,
/// with [`Emails::NotFound`] rendered as `["No email found"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emails {
    /// Distinct lowercase addresses in first-seen order. Never empty.
    Found(Vec<String>),
    /// No address matched.
    NotFound,
}

impl Emails {
    /// Whether at least one real address was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The real addresses, or an empty slice for [`Emails::NotFound`].
    pub fn addresses(&self) -> &[String] {
        match self {
            Self::Found(list) => list,
            Self::NotFound => &[],
        }
    }

    /// The externally visible list, substituting the placeholder when empty.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Found(list) => list.clone(),
            Self::NotFound => vec![NO_EMAIL_FOUND.to_owned()],
        }
    }
}

impl Serialize for Emails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(list) => list.serialize(serializer),
            Self::NotFound => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(NO_EMAIL_FOUND)?;
                seq.end()
            }
        }
    }
}

/// Scan `text` for email addresses.
///
/// Every match of `local@domain.tld` (ASCII local part, TLD of two or more
/// letters) is lowercased; duplicates are dropped case-insensitively while
/// keeping first-seen order. Empty or malformed input simply yields
/// [`Emails::NotFound`].
///
/// ```
/// use scout_core::email::{extract_emails, Emails};
///
/// let emails = extract_emails("contact a@b.com or A@B.COM");
/// assert_eq!(emails, Emails::Found(vec!["a@b.com".to_string()]));
/// assert_eq!(extract_emails("no contact info").to_vec(), vec!["No email found"]);
/// ```
pub fn extract_emails(text: &str) -> Emails {
    let mut seen = HashSet::new();
    let found: Vec<String> = EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|email| seen.insert(email.clone()))
        .collect();

    if found.is_empty() {
        Emails::NotFound
    } else {
        Emails::Found(found)
    }
}
