//! Read access to the tracker's message database (SQLite).

use anyhow::{Context, Result, anyhow};
use sqlite::{Connection, OpenFlags, State};
use std::path::Path;
use tracing::info;

const MESSAGE_COLUMNS: &str = "id, sender, chat, content, timestamp, parsed_content";

/// One row of the `messages` table.  NULL text columns read as empty.
///
/// Only `content`, `sender` and `timestamp` feed the report; `chat` and
/// `parsed_content` are carried so the struct mirrors the full row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub sender: String,
    pub chat: String,
    pub content: String,
    pub timestamp: String,
    pub parsed_content: Option<String>,
}

/// Selects one chat's messages with `date_from <= timestamp <= date_to`.
///
/// Bounds are compared as text, so a bare date like `2024-08-07` as the upper
/// bound stops at midnight: `2024-08-07 09:00:00 ...` sorts after it.
#[derive(Debug, Clone, Copy)]
pub struct MessageQuery<'a> {
    pub chat_id: &'a str,
    pub date_from: &'a str,
    pub date_to: &'a str,
}

/// Per-chat message count, for picking a chat to report on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub chat: String,
    pub messages: i64,
}

/// Open an existing database read-only.  A missing file is an error rather
/// than a fresh empty database.
pub fn open_db(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(anyhow!("Message database not found: {}", path.display()));
    }
    let conn = Connection::open_with_flags(path, OpenFlags::new().with_read_only())
        .with_context(|| format!("failed to open message database {}", path.display()))?;
    info!("Message DB opened at {}", path.display());
    Ok(conn)
}

pub fn fetch_messages(conn: &Connection, query: &MessageQuery<'_>) -> Result<Vec<ChatMessage>> {
    let mut stmt = conn
        .prepare(format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE timestamp BETWEEN ? AND ? AND chat = ?
             ORDER BY rowid"
        ))
        .context("failed to prepare messages query")?;
    stmt.bind((1, query.date_from))?;
    stmt.bind((2, query.date_to))?;
    stmt.bind((3, query.chat_id))?;

    let mut messages = Vec::new();
    while let State::Row = stmt.next().context("failed to read messages")? {
        messages.push(ChatMessage {
            id: read_text(&stmt, "id")?,
            sender: read_text(&stmt, "sender")?,
            chat: read_text(&stmt, "chat")?,
            content: read_text(&stmt, "content")?,
            timestamp: read_text(&stmt, "timestamp")?,
            parsed_content: stmt.read::<Option<String>, _>("parsed_content")?,
        });
    }
    Ok(messages)
}

pub fn list_chats(conn: &Connection) -> Result<Vec<ChatSummary>> {
    let mut stmt = conn
        .prepare("SELECT chat, COUNT(*) AS messages FROM messages GROUP BY chat ORDER BY chat")
        .context("failed to prepare chat list query")?;

    let mut chats = Vec::new();
    while let State::Row = stmt.next().context("failed to read chat list")? {
        chats.push(ChatSummary {
            chat: read_text(&stmt, "chat")?,
            messages: stmt.read::<i64, _>("messages")?,
        });
    }
    Ok(chats)
}

fn read_text(stmt: &sqlite::Statement<'_>, column: &str) -> Result<String> {
    Ok(stmt
        .read::<Option<String>, _>(column)
        .with_context(|| format!("failed to read column {column}"))?
        .unwrap_or_default())
}

// ─────────────────────────────── Tests ───────────────────────────────────

/// Create a tracker-shaped database at `path` and insert
/// `(id, sender, chat, content, timestamp)` rows.
#[cfg(test)]
pub(crate) fn seed_messages(path: &Path, rows: &[(&str, &str, &str, &str, &str)]) -> Result<()> {
    let conn = sqlite::open(path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            sender TEXT,
            chat TEXT,
            content TEXT,
            parsed_content TEXT,
            timestamp TEXT
         );",
    )?;
    for &(id, sender, chat, content, timestamp) in rows {
        let mut stmt = conn.prepare(
            "INSERT INTO messages (id, sender, chat, content, timestamp) VALUES (?, ?, ?, ?, ?)",
        )?;
        stmt.bind((1, id))?;
        stmt.bind((2, sender))?;
        stmt.bind((3, chat))?;
        stmt.bind((4, content))?;
        stmt.bind((5, timestamp))?;
        stmt.next()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: &str = "120363311602503571@g.us";

    fn query<'a>() -> MessageQuery<'a> {
        MessageQuery {
            chat_id: CHAT,
            date_from: "2024-07-28",
            date_to: "2024-08-07",
        }
    }

    #[test]
    fn fetches_chat_messages_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        seed_messages(
            &path,
            &[
                ("m0", "a", CHAT, "too early", "2024-07-27 23:59:59 +0300 EEST"),
                ("m1", "a", CHAT, "first", "2024-07-28 00:02:05 +0300 EEST"),
                ("m2", "b", "other@g.us", "other chat", "2024-07-30 10:00:00 +0300 EEST"),
                ("m3", "b", CHAT, "second", "2024-08-06 18:45:00 +0300 EEST"),
                ("m4", "c", CHAT, "upper bound day", "2024-08-07 09:00:00 +0300 EEST"),
            ],
        )
        .unwrap();

        let conn = open_db(&path).unwrap();
        let messages = fetch_messages(&conn, &query()).unwrap();
        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
        assert_eq!(messages[0].sender, "a");
        assert_eq!(messages[0].chat, CHAT);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[0].timestamp, "2024-07-28 00:02:05 +0300 EEST");
        assert_eq!(messages[0].parsed_content, None);
    }

    #[test]
    fn null_columns_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        seed_messages(&path, &[]).unwrap();
        {
            let conn = sqlite::open(&path).unwrap();
            conn.execute(
                "INSERT INTO messages (id, chat, timestamp, parsed_content)
                 VALUES ('n1', '120363311602503571@g.us', '2024-07-29 08:00:00 +0300 EEST', 'ocr');",
            )
            .unwrap();
        }

        let conn = open_db(&path).unwrap();
        let messages = fetch_messages(&conn, &query()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, "");
        assert_eq!(messages[0].content, "");
        assert_eq!(messages[0].parsed_content.as_deref(), Some("ocr"));
    }

    #[test]
    fn lists_chats_with_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        seed_messages(
            &path,
            &[
                ("1", "a", "b@g.us", "x", "2024-07-28 00:00:00 +0300 EEST"),
                ("2", "a", "a@g.us", "y", "2024-07-28 00:00:00 +0300 EEST"),
                ("3", "a", "b@g.us", "z", "2024-07-28 00:00:00 +0300 EEST"),
            ],
        )
        .unwrap();

        let conn = open_db(&path).unwrap();
        let chats = list_chats(&conn).unwrap();
        assert_eq!(
            chats,
            vec![
                ChatSummary { chat: "a@g.us".into(), messages: 1 },
                ChatSummary { chat: "b@g.us".into(), messages: 2 },
            ]
        );
    }

    #[test]
    fn missing_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let Err(err) = open_db(&path) else {
            panic!("opening a missing database should fail");
        };
        assert!(err.to_string().contains("absent.db"), "{err}");
        assert!(!path.exists());
    }
}
