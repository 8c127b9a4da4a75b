use crate::filter::{MessageMatcher, Needles};
use crate::report::{ReportFiles, ReportRow};
use crate::store::{self, MessageQuery};
use anyhow::{Context, Result};
use tracing::{info, warn};

use super::shared::ReportCfg;

/// Totals of one report run.
#[derive(Debug)]
pub(super) struct ReportSummary {
    pub scanned: usize,
    pub matched: usize,
    pub files: ReportFiles,
}

pub(super) fn run() -> Result<()> {
    let cfg = ReportCfg::from_env()?;
    let summary = generate(&cfg)?;
    info!(
        "Report complete: scanned={}, matched={}, written to {}, {}, {}",
        summary.scanned,
        summary.matched,
        summary.files.rows.display(),
        summary.files.by_location_date.display(),
        summary.files.by_location.display()
    );
    Ok(())
}

pub(super) fn generate(cfg: &ReportCfg) -> Result<ReportSummary> {
    info!("Report config: {cfg}");

    let needles = Needles::from_csv_path(&cfg.keyword_file)?;
    let matcher = MessageMatcher::new(needles, cfg.blacklist.clone());
    info!(
        "Loaded {} keyword(s) and {} location(s) from {}",
        matcher.needles().keyword_count(),
        matcher.needles().location_count(),
        cfg.keyword_file.display()
    );
    info!("Filter config: {matcher}");
    if cfg.blacklist.words().is_empty() {
        warn!("Blacklist is empty; no message will be excluded");
    }

    // Connection is released at the end of this block.
    let messages = {
        let conn = store::open_db(&cfg.database_path)?;
        store::fetch_messages(
            &conn,
            &MessageQuery {
                chat_id: &cfg.chat_id,
                date_from: &cfg.date_from,
                date_to: &cfg.date_to,
            },
        )
        .with_context(|| format!("failed to fetch messages for chat {}", cfg.chat_id))?
    };
    info!(
        "Fetched {} message(s) from {} between {} and {}",
        messages.len(),
        cfg.chat_id,
        cfg.date_from,
        cfg.date_to
    );

    let mut rows = Vec::new();
    for message in &messages {
        let Some(found) = matcher.check(&message.content) else {
            continue;
        };
        info!(
            "{} {} ({}, {})",
            message.timestamp, message.sender, found.keyword, found.location
        );
        rows.push(ReportRow::from_match(message, found)?);
    }

    if rows.is_empty() {
        warn!("No messages matched; writing header-only reports");
    }

    std::fs::create_dir_all(&cfg.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            cfg.output_dir.display()
        )
    })?;
    let files = ReportFiles::in_dir(&cfg.output_dir);
    files.write(&rows)?;

    Ok(ReportSummary {
        scanned: messages.len(),
        matched: rows.len(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Blacklist;
    use std::path::Path;

    const CHAT: &str = "120363311602503571@g.us";

    fn cfg(dir: &Path) -> ReportCfg {
        ReportCfg {
            database_path: dir.join("messages.db"),
            chat_id: CHAT.into(),
            keyword_file: dir.join("keywords.csv"),
            date_from: "2024-07-28".into(),
            date_to: "2024-08-07".into(),
            output_dir: dir.join("out"),
            blacklist: Blacklist::default(),
        }
    }

    #[test]
    fn end_to_end_report() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg(dir.path());
        std::fs::write(&cfg.keyword_file, "keyword,location\nProtest,Kyiv\n").unwrap();
        store::seed_messages(
            &cfg.database_path,
            &[
                (
                    "m1",
                    "alice",
                    CHAT,
                    "contains keyword 'protest' and location 'kyiv'",
                    "2024-07-28 00:02:05 +0300 EEST",
                ),
                ("m2", "bob", CHAT, "protest kyiv горловка", "2024-07-29 12:00:00 +0300 EEST"),
                ("m3", "carol", CHAT, "nothing relevant", "2024-07-30 12:00:00 +0300 EEST"),
                ("m4", "dave", "other@g.us", "protest kyiv", "2024-07-30 12:00:00 +0300 EEST"),
            ],
        )
        .unwrap();

        let summary = generate(&cfg).unwrap();
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.matched, 1);

        let rows = std::fs::read_to_string(&summary.files.rows).unwrap();
        assert_eq!(
            rows,
            "location,keyword,timestamp,content,date,time\n\
             kyiv,protest,2024-07-28 00:02:05+03:00,contains keyword 'protest' and location 'kyiv',2024-07-28,00:02:05\n"
        );
        assert_eq!(
            std::fs::read_to_string(&summary.files.by_location_date).unwrap(),
            "location,date,count\nkyiv,2024-07-28,1\n"
        );
        assert_eq!(
            std::fs::read_to_string(&summary.files.by_location).unwrap(),
            "location,count\nkyiv,1\n"
        );
    }

    #[test]
    fn counts_multiple_locations() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg(dir.path());
        std::fs::write(&cfg.keyword_file, "keyword,location\nprotest,kyiv\n,lviv\n").unwrap();
        store::seed_messages(
            &cfg.database_path,
            &[
                ("1", "a", CHAT, "protest in kyiv", "2024-07-28 09:00:00 +0300 EEST"),
                ("2", "b", CHAT, "another protest, kyiv", "2024-07-28 11:00:00 +0300 EEST"),
                ("3", "c", CHAT, "protest lviv", "2024-07-28 13:00:00 +0300 EEST"),
                ("4", "d", CHAT, "protest lviv", "2024-07-29 13:00:00 +0300 EEST"),
            ],
        )
        .unwrap();

        let summary = generate(&cfg).unwrap();
        assert_eq!(summary.matched, 4);
        assert_eq!(
            std::fs::read_to_string(&summary.files.by_location_date).unwrap(),
            "location,date,count\nkyiv,2024-07-28,2\nlviv,2024-07-28,1\nlviv,2024-07-29,1\n"
        );
        assert_eq!(
            std::fs::read_to_string(&summary.files.by_location).unwrap(),
            "location,count\nkyiv,2\nlviv,2\n"
        );
    }

    #[test]
    fn no_matches_writes_empty_reports() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg(dir.path());
        std::fs::write(&cfg.keyword_file, "keyword,location\nprotest,kyiv\n").unwrap();
        store::seed_messages(&cfg.database_path, &[]).unwrap();

        let summary = generate(&cfg).unwrap();
        assert_eq!(summary.scanned, 0);
        assert_eq!(summary.matched, 0);
        assert_eq!(
            std::fs::read_to_string(&summary.files.by_location).unwrap(),
            "location,count\n"
        );
    }

    #[test]
    fn missing_keyword_file_fails_before_touching_output() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg(dir.path());
        store::seed_messages(&cfg.database_path, &[]).unwrap();

        assert!(generate(&cfg).is_err());
        assert!(!cfg.output_dir.exists());
    }
}
