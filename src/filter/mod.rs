//! Keyword / location matching for chat messages.
//!
//! A message is reported when its text contains at least one keyword and at
//! least one location (case-insensitive substring match) and none of the
//! blacklisted words.
pub mod blacklist;
pub mod needles;

use std::fmt;

use tracing::debug;

pub use crate::filter::blacklist::Blacklist;
pub use crate::filter::needles::Needles;

/// The `(keyword, location)` pair that qualified a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeedleMatch {
    pub keyword: String,
    pub location: String,
}

/// Stateless matcher over a fixed needle set and blacklist.
pub struct MessageMatcher {
    needles: Needles,
    blacklist: Blacklist,
}

impl MessageMatcher {
    pub fn new(needles: Needles, blacklist: Blacklist) -> Self {
        Self { needles, blacklist }
    }

    /// Returns the first qualifying pair, or `None` when the message lacks a
    /// keyword, lacks a location, or contains a blacklisted word.
    ///
    /// Needles are visited in sorted order, keyword first, so when several
    /// pairs qualify the lexicographically smallest keyword wins, then the
    /// smallest location.
    pub fn check(&self, text: &str) -> Option<NeedleMatch> {
        let lower = text.to_lowercase();

        for keyword in self.needles.keywords().filter(|kw| lower.contains(kw)) {
            let Some(location) = self.needles.locations().find(|loc| lower.contains(loc)) else {
                continue;
            };

            if let Some(word) = self.blacklist.hits(&lower) {
                debug!("Blacklisted word {word:?} present – skipping ({keyword}, {location})");
                return None;
            }

            return Some(NeedleMatch {
                keyword: keyword.to_owned(),
                location: location.to_owned(),
            });
        }

        None
    }

    pub fn needles(&self) -> &Needles {
        &self.needles
    }
}

impl fmt::Display for MessageMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MessageMatcher(keywords={}, locations={}, blacklist={})",
            self.needles.keyword_count(),
            self.needles.location_count(),
            self.blacklist,
        )
    }
}
