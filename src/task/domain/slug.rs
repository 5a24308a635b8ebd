//! URL-friendly topic slugs.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest slug the topic schema stores.
const MAX_SLUG_LEN: usize = 100;

/// Normalized, URL-friendly identifier derived from a topic title.
///
/// Slug derivation is deterministic: two titles that normalize identically
/// produce the same slug, which is what lets `create_topic` completions
/// reuse an existing topic instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derives a slug from a topic title.
    ///
    /// Titles are lowercased with Turkish characters transliterated to their
    /// ASCII neighbours (ı→i, ğ→g, ü→u, ş→s, ö→o, ç→c), spaces become
    /// hyphens, anything outside `[a-z0-9-]` is stripped, hyphen runs are
    /// collapsed, and the result is trimmed of hyphens and capped at 100
    /// characters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySlug`] when nothing survives
    /// normalization.
    pub fn from_title(title: &str) -> Result<Self, TaskDomainError> {
        let mut slug = String::with_capacity(title.len());
        for ch in title.trim().chars() {
            match fold_char(ch) {
                Some('-') => {
                    if !slug.is_empty() && !slug.ends_with('-') {
                        slug.push('-');
                    }
                }
                Some(folded) => slug.push(folded),
                None => {}
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug.truncate(MAX_SLUG_LEN);

        if slug.is_empty() {
            return Err(TaskDomainError::EmptySlug(title.to_owned()));
        }
        Ok(Self(slug))
    }

    /// Validates a slug value that was normalized previously (e.g. read back
    /// from storage).
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidSlug`] when the value is empty,
    /// exceeds the stored length, or contains characters outside
    /// `[a-z0-9-]`.
    pub fn parse(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let is_valid = !raw.is_empty()
            && raw.len() <= MAX_SLUG_LEN
            && raw
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !is_valid {
            return Err(TaskDomainError::InvalidSlug(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the slug as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps one title character to its slug form: `Some('-')` for separators,
/// `Some(c)` for characters that survive, `None` for stripped input.
const fn fold_char(ch: char) -> Option<char> {
    match ch {
        'ı' | 'İ' => Some('i'),
        'ğ' | 'Ğ' => Some('g'),
        'ü' | 'Ü' => Some('u'),
        'ş' | 'Ş' => Some('s'),
        'ö' | 'Ö' => Some('o'),
        'ç' | 'Ç' => Some('c'),
        ' ' | '-' => Some('-'),
        _ => {
            let folded = ch.to_ascii_lowercase();
            if folded.is_ascii_lowercase() || folded.is_ascii_digit() {
                Some(folded)
            } else {
                None
            }
        }
    }
}
