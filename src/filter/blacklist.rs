use std::fmt;

/// Words that disqualify a message outright, even when it carries both a
/// keyword and a location.  Occupied-territory place names go here so that
/// reports about them do not inflate the counts of similarly named towns.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "горловка", // RU: Horlivka
];

/// Lowercased disqualifying substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blacklist {
    words: Vec<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new(DEFAULT_BLACKLIST.iter().copied())
    }
}

impl Blacklist {
    pub fn new<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut list: Vec<String> = Vec::new();
        for word in words {
            let word = word.trim().to_lowercase();
            if !word.is_empty() && !list.contains(&word) {
                list.push(word);
            }
        }
        Self { words: list }
    }

    /// Parse a comma-separated override.  `None` (variable unset) keeps the
    /// built-in list; an empty string disables the blacklist.
    pub fn from_setting(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => Self::new(raw.split(',')),
            None => Self::default(),
        }
    }

    /// Return the first blacklisted word contained in `lower` (already
    /// lowercased text).
    pub fn hits<'a>(&'a self, lower: &str) -> Option<&'a str> {
        self.words
            .iter()
            .map(String::as_str)
            .find(|word| lower.contains(word))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl fmt::Display for Blacklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.words)
    }
}
