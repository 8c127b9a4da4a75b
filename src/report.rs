//! Report rows, grouped counts, and CSV output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};

use crate::filter::NeedleMatch;
use crate::store::ChatMessage;
use crate::timestamp::{NormalizedTimestamp, OUTPUT_FORMAT};

pub const ROWS_FILE: &str = "result.csv";
pub const BY_LOCATION_DATE_FILE: &str = "result_aggregated_location_date.csv";
pub const BY_LOCATION_FILE: &str = "result_aggregated_location.csv";

/// A CSV-serializable row type with a fixed header.  The header is written
/// even when there are no rows.
pub trait CsvTable: Serialize {
    const HEADERS: &'static [&'static str];
}

/// One matched message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub location: String,
    pub keyword: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    pub content: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl CsvTable for ReportRow {
    const HEADERS: &'static [&'static str] =
        &["location", "keyword", "timestamp", "content", "date", "time"];
}

impl ReportRow {
    pub fn from_match(message: &ChatMessage, found: NeedleMatch) -> Result<Self> {
        let ts = NormalizedTimestamp::parse(&message.timestamp)
            .with_context(|| format!("message {} has a bad timestamp", message.id))?;
        Ok(Self {
            location: found.location,
            keyword: found.keyword,
            timestamp: ts.at(),
            content: message.content.clone(),
            date: ts.date(),
            time: ts.time(),
        })
    }
}

fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<FixedOffset>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(OUTPUT_FORMAT))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationDateCount {
    pub location: String,
    pub date: NaiveDate,
    pub count: usize,
}

impl CsvTable for LocationDateCount {
    const HEADERS: &'static [&'static str] = &["location", "date", "count"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

impl CsvTable for LocationCount {
    const HEADERS: &'static [&'static str] = &["location", "count"];
}

/// Row counts per `(location, date)`, ascending by location then date.
pub fn aggregate_by_location_date(rows: &[ReportRow]) -> Vec<LocationDateCount> {
    let mut counts: BTreeMap<(&str, NaiveDate), usize> = BTreeMap::new();
    for row in rows {
        *counts.entry((row.location.as_str(), row.date)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((location, date), count)| LocationDateCount {
            location: location.to_owned(),
            date,
            count,
        })
        .collect()
}

/// Row counts per location, ascending by location.
pub fn aggregate_by_location(rows: &[ReportRow]) -> Vec<LocationCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.location.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(location, count)| LocationCount {
            location: location.to_owned(),
            count,
        })
        .collect()
}

pub fn write_csv<T: CsvTable>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Output locations of one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub rows: PathBuf,
    pub by_location_date: PathBuf,
    pub by_location: PathBuf,
}

impl ReportFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            rows: dir.join(ROWS_FILE),
            by_location_date: dir.join(BY_LOCATION_DATE_FILE),
            by_location: dir.join(BY_LOCATION_FILE),
        }
    }

    /// Write the row-level report and both aggregates.
    pub fn write(&self, rows: &[ReportRow]) -> Result<()> {
        write_csv(&self.rows, rows)?;
        write_csv(&self.by_location_date, &aggregate_by_location_date(rows))?;
        write_csv(&self.by_location, &aggregate_by_location(rows))?;
        Ok(())
    }
}
