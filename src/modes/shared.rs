use anyhow::{Result, anyhow};
use std::fmt;
use std::path::PathBuf;

use crate::filter::Blacklist;

pub(super) const DEFAULT_DB_PATH: &str = "prod_whatsgo_07_08_2024.db";
pub(super) const DEFAULT_CHAT_ID: &str = "120363311602503571@g.us";
pub(super) const DEFAULT_KEYWORDS_PATH: &str = "keywords.csv";
pub(super) const DEFAULT_DATE_FROM: &str = "2024-07-28";
pub(super) const DEFAULT_DATE_TO: &str = "2024-08-07";
pub(super) const DEFAULT_OUTPUT_DIR: &str = ".";

/// Everything one report run needs.
#[derive(Debug, Clone)]
pub(super) struct ReportCfg {
    pub database_path: PathBuf,
    pub chat_id: String,
    pub keyword_file: PathBuf,
    /// Inclusive lower bound, compared as text against stored timestamps.
    pub date_from: String,
    /// Inclusive upper bound, compared as text against stored timestamps.
    pub date_to: String,
    pub output_dir: PathBuf,
    pub blacklist: Blacklist,
}

impl ReportCfg {
    /// Construct from environment variables.
    ///
    /// | Env var                | Default                       |
    /// |------------------------|-------------------------------|
    /// | `REPORT_DB_PATH`       | `prod_whatsgo_07_08_2024.db`  |
    /// | `REPORT_CHAT_ID`       | `120363311602503571@g.us`     |
    /// | `REPORT_KEYWORDS_PATH` | `keywords.csv`                |
    /// | `REPORT_DATE_FROM`     | `2024-07-28`                  |
    /// | `REPORT_DATE_TO`       | `2024-08-07`                  |
    /// | `REPORT_OUTPUT_DIR`    | `.`                           |
    /// | `REPORT_BLACKLIST`     | `горловка` (comma-separated)  |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let cfg = Self {
            database_path: get("REPORT_DB_PATH", DEFAULT_DB_PATH).into(),
            // Unset falls back to the default; set-but-blank is rejected below.
            chat_id: lookup("REPORT_CHAT_ID")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_CHAT_ID.to_string()),
            keyword_file: get("REPORT_KEYWORDS_PATH", DEFAULT_KEYWORDS_PATH).into(),
            date_from: get("REPORT_DATE_FROM", DEFAULT_DATE_FROM),
            date_to: get("REPORT_DATE_TO", DEFAULT_DATE_TO),
            output_dir: get("REPORT_OUTPUT_DIR", DEFAULT_OUTPUT_DIR).into(),
            blacklist: Blacklist::from_setting(lookup("REPORT_BLACKLIST").as_deref()),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chat_id.is_empty() {
            return Err(anyhow!("REPORT_CHAT_ID is empty"));
        }
        if self.date_from > self.date_to {
            return Err(anyhow!(
                "REPORT_DATE_FROM ({}) is after REPORT_DATE_TO ({})",
                self.date_from,
                self.date_to
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ReportCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReportCfg(db={}, chat={}, keywords={}, range={}..={}, out={}, blacklist={})",
            self.database_path.display(),
            self.chat_id,
            self.keyword_file.display(),
            self.date_from,
            self.date_to,
            self.output_dir.display(),
            self.blacklist,
        )
    }
}

pub(super) fn load_db_path() -> PathBuf {
    std::env::var("REPORT_DB_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.into())
        .into()
}
