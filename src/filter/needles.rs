//! Keyword / location reference table.
//!
//! The table is a plain CSV with a header row that names (at least) the
//! `keyword` and `location` columns.  The two columns are independent: a row
//! may carry only a keyword, only a location, or both.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

const KEYWORD_COLUMN: &str = "keyword";
const LOCATION_COLUMN: &str = "location";

#[derive(Debug, Default, Deserialize)]
struct NeedleRecord {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

/// Lowercased, trimmed, non-empty search terms.  Kept in ordered sets so
/// that iteration (and therefore the first-match tie-break) is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Needles {
    keywords: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl Needles {
    /// Load the reference table from `path`.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open keyword file {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to load needles from {}", path.display()))
    }

    /// Parse the reference table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers().context("failed to read CSV header row")?;
        for column in [KEYWORD_COLUMN, LOCATION_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(anyhow!("keyword file has no `{column}` column"));
            }
        }

        let mut records = Vec::new();
        for (idx, record) in reader.deserialize::<NeedleRecord>().enumerate() {
            // +2: one for the header row, one for 1-based line numbers.
            let record = record.with_context(|| format!("invalid CSV record at line {}", idx + 2))?;
            records.push(record);
        }

        Ok(Self::from_pairs(
            records
                .iter()
                .map(|r| (r.keyword.as_deref(), r.location.as_deref())),
        ))
    }

    /// Build from raw `(keyword, location)` cells.  Missing and blank cells
    /// are dropped; everything else is trimmed and lowercased.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
    {
        let mut needles = Self::default();
        for (keyword, location) in pairs {
            if let Some(keyword) = keyword.and_then(normalize) {
                needles.keywords.insert(keyword);
            }
            if let Some(location) = location.and_then(normalize) {
                needles.locations.insert(location);
            }
        }
        needles
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(String::as_str)
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}

fn normalize(raw: &str) -> Option<String> {
    let value = raw.trim().to_lowercase();
    (!value.is_empty()).then_some(value)
}
